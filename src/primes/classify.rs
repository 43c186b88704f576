/// Classify `value` by trial division, returning the verdict and a message
/// suitable for printing back to the user.
///
/// The divisor bound is `sqrt(value)` computed in `f64` and truncated, which
/// loses precision for inputs close to `i64::MAX`.
pub fn is_prime(value: i64) -> (bool, String) {
    if value == 0 || value == 1 {
        return (false, format!("{} is not prime, by definition!", value));
    }

    if value < 0 {
        return (false, "negative numbers are not prime, by definition!".to_string());
    }

    let limit = (value as f64).sqrt() as i64;
    for divisor in 2..=limit {
        if value % divisor == 0 {
            return (
                false,
                format!("{} is not prime, it is divisible by {}!", value, divisor),
            );
        }
    }

    (true, format!("{} is a prime number!", value))
}
