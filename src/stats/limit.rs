/// Keep the first `n` entries when limiting is enabled and `n` is non-zero.
///
/// `n` is trusted as-is; clamping happens where the value is entered.
pub fn limit<T>(mut ranked: Vec<T>, enabled: bool, n: usize) -> Vec<T> {
    if enabled && n > 0 {
        ranked.truncate(n);
    }
    ranked
}
