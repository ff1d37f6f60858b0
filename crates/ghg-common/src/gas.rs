use std::fmt;

/// The three greenhouse gases every category reports on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gas {
    Co2,
    Ch4,
    N2o,
}

impl Gas {
    pub const ALL: [Gas; 3] = [Gas::Co2, Gas::Ch4, Gas::N2o];

    /// Key used by the GWP, electricity and travel factor tables.
    pub fn factor_key(self) -> &'static str {
        match self {
            Gas::Co2 => "co2",
            Gas::Ch4 => "ch4",
            Gas::N2o => "n2o",
        }
    }

    /// Key used in output documents.
    pub fn label(self) -> &'static str {
        match self {
            Gas::Co2 => "CO2",
            Gas::Ch4 => "CH4",
            Gas::N2o => "N2O",
        }
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
