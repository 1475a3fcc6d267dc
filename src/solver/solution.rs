//! In-process solution adapter.

use super::SolutionSource;

/// Solution reported as parallel name and value arrays.
///
/// Matches engines that expose variable names and primal values as two
/// attribute vectors of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedSolution {
    names: Vec<String>,
    values: Vec<f64>,
    runtime_secs: f64,
}

impl NamedSolution {
    /// Creates an empty solution with the given solve time.
    pub fn new(runtime_secs: f64) -> Self {
        Self {
            runtime_secs,
            ..Self::default()
        }
    }

    /// Creates a solution from attribute vectors.
    ///
    /// # Panics
    ///
    /// Panics if `names` and `values` differ in length.
    pub fn from_attributes(names: Vec<String>, values: Vec<f64>, runtime_secs: f64) -> Self {
        assert_eq!(
            names.len(),
            values.len(),
            "names and values must have equal length"
        );
        Self {
            names,
            values,
            runtime_secs,
        }
    }

    pub fn push(&mut self, name: String, value: f64) {
        self.names.push(name);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SolutionSource for NamedSolution {
    fn variables(&self) -> Box<dyn Iterator<Item = (&str, f64)> + '_> {
        Box::new(
            self.names
                .iter()
                .map(String::as_str)
                .zip(self.values.iter().copied()),
        )
    }

    fn runtime_secs(&self) -> f64 {
        self.runtime_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_names_with_values() {
        let s = NamedSolution::from_attributes(
            vec!["p[g1,0]".into(), "status[g1,0]".into()],
            vec![12.0, 1.0],
            0.5,
        );
        let pairs: Vec<(&str, f64)> = s.variables().collect();
        assert_eq!(pairs, vec![("p[g1,0]", 12.0), ("status[g1,0]", 1.0)]);
        assert_eq!(s.runtime_secs(), 0.5);
    }

    #[test]
    #[should_panic]
    fn mismatched_attributes_panic() {
        NamedSolution::from_attributes(vec!["p[g1,0]".into()], Vec::new(), 0.0);
    }
}
