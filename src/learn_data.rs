//! Reader for line-oriented training files.
//!
//! ```text
//! topology: 2 4 1
//! in: 1.0 0.0
//! out: 1.0
//! in: 0.0 0.0
//! out: 0.0
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::network::validate_topology;

use tracing::debug;

/// A training example, `(network input, expected output)`.
pub type Example = (Vec<f64>, Vec<f64>);

/// A topology and the labelled examples to train it on.
#[derive(Clone, Debug, PartialEq)]
pub struct LearnData {
    topology: Vec<usize>,
    examples: Vec<Example>,
}

impl LearnData {
    /// Reads training data from the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = Self::from_reader(BufReader::new(File::open(path)?))?;
        debug!(path = %path.display(), examples = data.len(), "read training data");
        Ok(data)
    }

    /// Parses training data. Blank lines are ignored.
    pub fn from_reader<R: BufRead>(input: R) -> Result<Self> {
        let mut lines = Vec::new();
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push((i + 1, line));
            }
        }
        let mut lines = lines.into_iter();

        let (line_no, first) = lines
            .next()
            .ok_or_else(|| Error::parse(1, "missing `topology:` line"))?;
        let topology = parse_labelled(line_no, &first, "topology:", |token| {
            token.parse::<usize>().ok()
        })?;
        validate_topology(&topology)?;

        let mut examples = Vec::new();
        while let Some((in_no, in_line)) = lines.next() {
            let inputs = parse_labelled(in_no, &in_line, "in:", parse_f64)?;
            let (out_no, out_line) = lines
                .next()
                .ok_or_else(|| Error::parse(in_no, "input has no matching `out:` line"))?;
            let targets = parse_labelled(out_no, &out_line, "out:", parse_f64)?;

            let index = examples.len();
            check_len(index, "input", topology[0], inputs.len())?;
            check_len(index, "target", topology[topology.len() - 1], targets.len())?;
            examples.push((inputs, targets));
        }

        Ok(LearnData { topology, examples })
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

fn parse_f64(token: &str) -> Option<f64> {
    token.parse().ok()
}

/// Parses `<label> <value>...`, returning the values.
fn parse_labelled<T, F>(line_no: usize, line: &str, label: &str, parse: F) -> Result<Vec<T>>
where
    F: Fn(&str) -> Option<T>,
{
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some(found) if found == label => {}
        Some(found) => {
            return Err(Error::parse(
                line_no,
                format!("expected `{}`, found `{}`", label, found),
            ))
        }
        None => return Err(Error::parse(line_no, format!("expected `{}`", label))),
    }
    tokens
        .map(|token| {
            parse(token).ok_or_else(|| Error::parse(line_no, format!("invalid value `{}`", token)))
        })
        .collect()
}

fn check_len(index: usize, kind: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::SampleShape {
            index,
            kind,
            expected,
            actual,
        })
    }
}
