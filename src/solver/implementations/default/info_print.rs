// Progress printing for DefaultInfo.  All output is optional textual
// diagnostics gated on the `print` setting; nothing here affects the
// iterate or control flow.

use super::*;
use crate::algebra::*;

// indentation prefix for the per-iteration detail block
const INDENT: &str = "  ";

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub(crate) fn print_status_impl(&self, settings: &DefaultSettings<T>) {
        if !settings.print {
            return;
        }
        println!("iter {}:", self.iterations);
        println!("{INDENT}||  x  ||_2 = {:.6e}", self.norm_x);
        println!("{INDENT}||  y  ||_2 = {:.6e}", self.norm_y);
        println!("{INDENT}||  z  ||_2 = {:.6e}", self.norm_z);
        println!("{INDENT}||  s  ||_2 = {:.6e}", self.norm_s);
        println!(
            "{INDENT}|| r_b ||_2 / (1 + || b ||_2) = {:.6e}",
            self.rb_conv
        );
        println!(
            "{INDENT}|| r_c ||_2 / (1 + || c ||_2) = {:.6e}",
            self.rc_conv
        );
        println!(
            "{INDENT}|| r_h ||_2 / (1 + || h ||_2) = {:.6e}",
            self.rh_conv
        );
        println!("{INDENT}primal = {:.9e}", self.prim_obj);
        println!("{INDENT}dual   = {:.9e}", self.dual_obj);
        println!("{INDENT}relative duality gap = {:.6e}", self.max_rel_gap);
    }

    pub(crate) fn print_centrality_impl(
        &self,
        settings: &DefaultSettings<T>,
        α_pri_aff: T,
        α_dual_aff: T,
        μ_aff: T,
        μ: T,
        σ: T,
    ) {
        if !settings.print {
            return;
        }
        println!("{INDENT}alpha_aff_pri = {α_pri_aff:.6e}, alpha_aff_dual = {α_dual_aff:.6e}");
        println!("{INDENT}mu_aff = {μ_aff:.6e}, mu = {μ:.6e}");
        println!("{INDENT}sigma = {σ:.6e}");
    }

    pub(crate) fn print_step_lengths_impl(&self, settings: &DefaultSettings<T>, α_pri: T, α_dual: T) {
        if !settings.print {
            return;
        }
        println!("{INDENT}alpha_pri = {α_pri:.6e}, alpha_dual = {α_dual:.6e}");
    }

    pub(crate) fn print_direction_errors_impl(
        &self,
        settings: &DefaultSettings<T>,
        errors: (T, T, T),
    ) {
        if !settings.print {
            return;
        }
        let (dx_error, dy_error, dz_error) = errors;
        println!("{INDENT}|| dx error ||_2 / (1 + || r_b ||_2) = {dx_error:.6e}");
        println!("{INDENT}|| dy error ||_2 / (1 + || r_c ||_2) = {dy_error:.6e}");
        println!("{INDENT}|| dz error ||_2 / (1 + || r_h ||_2) = {dz_error:.6e}");
    }

    pub(crate) fn print_footer_impl(&self, settings: &DefaultSettings<T>) {
        if !settings.print {
            return;
        }
        println!("terminated after {} iterations: {}", self.iterations, self.status);
        println!("{INDENT}primal objective = {:.9e}", self.prim_obj);
        println!("{INDENT}dual objective   = {:.9e}", self.dual_obj);
        println!("{INDENT}dimacs error     = {:.6e}", self.dimacs_error);
    }
}
