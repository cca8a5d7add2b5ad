use std::io::BufRead;

use crate::chem::Chemistry;
use crate::io::error::Error;
use crate::score::Stock;

/// Reads a stock file: one structure per line, optionally followed by
/// whitespace-separated columns, `#` comments allowed.
pub fn read<R: BufRead, C: Chemistry + ?Sized>(
    mut reader: R,
    name: &str,
    chem: &C,
) -> Result<Stock, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(Stock::parse(name, &text, chem))
}
