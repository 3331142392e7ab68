pub mod demo;
pub mod pairplot;
pub mod sample;
pub mod simulate;
pub mod train;

use std::error::Error;

/// Parses a comma separated list of floats, e.g. `0,0,0`.
pub fn parse_vector(raw: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    raw.split(',')
        .map(|piece| {
            piece
                .trim()
                .parse::<f64>()
                .map_err(|err| format!("invalid number {piece:?}: {err}").into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_vector;

    #[test]
    fn parses_comma_lists() {
        assert_eq!(parse_vector("0, -1.5,2").unwrap(), vec![0.0, -1.5, 2.0]);
        assert!(parse_vector("1,oops").is_err());
    }
}
