/// Returns a configuration error from the enclosing function unless a numerical value
/// lies in the closed interval `[a,b]`
///
/// ### Example
/// ```ignore
/// let epsilon = 2.0;
/// ensure_interval!(epsilon, 0.0, 1.0);
/// ```
/// This returns `Error::Configuration` with the message "invalid value for \`epsilon\` (2): must be in the interval \[0, 1\]".
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::error::Error::config(format!(
                "invalid value for `{}` ({}): must be in the interval [{}, {}]",
                stringify!($var),
                $var,
                $a,
                $b,
            )));
        }
    };
}

/// Returns a configuration error from the enclosing function unless the condition holds
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            return Err($crate::error::Error::config(format!($($arg)+)));
        }
    };
}

/// Index of the largest value, ties going to the lowest index
///
/// NaN entries never win a comparison. Returns `None` for an empty slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &x)| match best {
            Some((_, b)) if x > b => Some((i, x)),
            None if !x.is_nan() => Some((i, x)),
            _ => best,
        })
        .map(|(i, _)| i)
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
