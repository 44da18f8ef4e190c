/// Stable 64-bit id for a name, used where the source carries no player id.
/// The same name maps to the same id across tournaments and runs.
pub fn name_hash(name: &str) -> i64 {
    name.chars()
        .fold(0i64, |h, c| h.wrapping_mul(31).wrapping_add(c as i64))
}
