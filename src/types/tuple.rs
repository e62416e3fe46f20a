use std::fmt;

/// A fixed-width record of 32-bit integers, as stored in one page slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuple {
    pub values: Vec<i32>,
}

impl Tuple {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values }
    }
}

impl From<Vec<i32>> for Tuple {
    fn from(values: Vec<i32>) -> Self {
        Self::new(values)
    }
}

impl<const N: usize> From<[i32; N]> for Tuple {
    fn from(values: [i32; N]) -> Self {
        Self::new(values.to_vec())
    }
}

// Comma separated, the same shape the dump output uses
impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
