//! Saving and restoring connection weights as text.
//!
//! The file holds one `W: <weight>` / `DW: <delta weight>` line pair per
//! connection, walking layers, then non-bias neurons, then connections. The
//! bias neurons' connections follow in the same order as `BW:` / `BDW:`
//! pairs. Files without the bias section are accepted and leave the bias
//! weights as they are.
//!
//! The format records no layer sizes, so loading can only check the total
//! number of neuron and bias connections against the network. A file saved
//! from a different topology with the same totals loads without error.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::neuron::Connection;

use tracing::{debug, warn};

const WEIGHT: &str = "W:";
const DELTA: &str = "DW:";
const BIAS_WEIGHT: &str = "BW:";
const BIAS_DELTA: &str = "BDW:";

/// Writes every connection of `network` to `out`.
pub fn write_weights<W: Write>(network: &Network, mut out: W) -> Result<()> {
    for layer in network.layers() {
        for neuron in layer.units() {
            for conn in neuron.output_weights() {
                writeln!(out, "{} {}", WEIGHT, conn.weight)?;
                writeln!(out, "{} {}", DELTA, conn.delta_weight)?;
            }
        }
    }
    for layer in network.layers() {
        for conn in layer.bias().output_weights() {
            writeln!(out, "{} {}", BIAS_WEIGHT, conn.weight)?;
            writeln!(out, "{} {}", BIAS_DELTA, conn.delta_weight)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Replaces the connections of `network` with those read from `input`.
///
/// The whole input is checked against the network's topology before any
/// weight is touched.
pub fn read_weights<R: BufRead>(network: &mut Network, input: R) -> Result<()> {
    let mut units = Vec::new();
    let mut biases = Vec::new();
    let mut pending: Option<(usize, &'static str, f64)> = None;

    for (i, line) in input.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let mut tokens = line.split_whitespace();
        let label = match tokens.next() {
            Some(label) => label,
            None => continue,
        };
        let value = parse_value(line_no, label, tokens)?;

        match (pending.take(), label) {
            (None, WEIGHT) => pending = Some((line_no, DELTA, value)),
            (None, BIAS_WEIGHT) => pending = Some((line_no, BIAS_DELTA, value)),
            (Some((_, expected, weight)), label) if label == expected => {
                let conn = Connection {
                    weight,
                    delta_weight: value,
                };
                if expected == DELTA {
                    units.push(conn);
                } else {
                    biases.push(conn);
                }
            }
            (Some((_, expected, _)), label) => {
                return Err(Error::parse(
                    line_no,
                    format!("expected `{}`, found `{}`", expected, label),
                ));
            }
            (None, label) => {
                return Err(Error::parse(line_no, format!("unexpected label `{}`", label)));
            }
        }
    }
    if let Some((line_no, expected, _)) = pending {
        return Err(Error::parse(
            line_no,
            format!("weight is missing its `{}` line", expected),
        ));
    }

    let (unit_count, bias_count) = connection_counts(network);
    if units.len() != unit_count {
        return Err(Error::WeightCount {
            kind: "neuron",
            expected: unit_count,
            found: units.len(),
        });
    }
    if !biases.is_empty() && biases.len() != bias_count {
        return Err(Error::WeightCount {
            kind: "bias",
            expected: bias_count,
            found: biases.len(),
        });
    }

    let restore_bias = !biases.is_empty();
    let mut units = units.into_iter();
    let mut biases = biases.into_iter();
    for layer in network.layers_mut() {
        for neuron in layer.units_mut() {
            for (conn, stored) in neuron.output_weights_mut().iter_mut().zip(&mut units) {
                *conn = stored;
            }
        }
        for (conn, stored) in layer.bias_mut().output_weights_mut().iter_mut().zip(&mut biases) {
            *conn = stored;
        }
    }
    if !restore_bias {
        warn!("weight file has no bias section, keeping current bias weights");
    }
    debug!(connections = unit_count, biases = bias_count, "loaded weights");
    Ok(())
}

/// Writes the weights of `network` to the file at `path`.
pub fn save_weights<P: AsRef<Path>>(network: &Network, path: P) -> Result<()> {
    let path = path.as_ref();
    write_weights(network, BufWriter::new(File::create(path)?))?;
    debug!(path = %path.display(), "saved weights");
    Ok(())
}

/// Reads the weights of `network` from the file at `path`.
pub fn load_weights<P: AsRef<Path>>(network: &mut Network, path: P) -> Result<()> {
    read_weights(network, BufReader::new(File::open(path)?))
}

fn parse_value<'a, I>(line_no: usize, label: &str, mut tokens: I) -> Result<f64>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens
        .next()
        .ok_or_else(|| Error::parse(line_no, format!("`{}` has no value", label)))?;
    let value = token
        .parse::<f64>()
        .map_err(|_| Error::parse(line_no, format!("invalid number `{}`", token)))?;
    if let Some(extra) = tokens.next() {
        return Err(Error::parse(line_no, format!("unexpected `{}`", extra)));
    }
    Ok(value)
}

/// Returns how many non-bias and bias connections `network` holds.
fn connection_counts(network: &Network) -> (usize, usize) {
    network.topology().windows(2).fold((0, 0), |(units, biases), pair| {
        (units + pair[0] * pair[1], biases + pair[1])
    })
}
