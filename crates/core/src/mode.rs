use serde::{Deserialize, Serialize};

use crate::errors::UnknownModeError;

/// Operating mode for one orchestration run.
///
/// Selected once per run and immutable afterwards; determines the output
/// schema, the prompt framing, and the capability set the model may invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    /// Geometry and yield calculations (sheet counts, areas, kerf allowances).
    Calc,
    /// Priced material list with supplier detail.
    Price,
    /// Finalized quote table ready for the job record.
    Table,
}

impl QuoteMode {
    pub const ALL: [QuoteMode; 3] = [Self::Calc, Self::Price, Self::Table];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calc => "calc",
            Self::Price => "price",
            Self::Table => "table",
        }
    }

    /// Name of the terminal capability that is the only successful exit from
    /// a run in this mode.
    pub fn terminal_capability(&self) -> &'static str {
        match self {
            Self::Calc => "emit_calc_result",
            Self::Price => "emit_price_result",
            Self::Table => "emit_table_result",
        }
    }
}

impl std::fmt::Display for QuoteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuoteMode {
    type Err = UnknownModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "calc" => Ok(Self::Calc),
            "price" => Ok(Self::Price),
            "table" => Ok(Self::Table),
            other => Err(UnknownModeError::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QuoteMode;

    #[test]
    fn parses_known_modes_case_insensitively() {
        assert_eq!("calc".parse::<QuoteMode>().unwrap(), QuoteMode::Calc);
        assert_eq!(" PRICE ".parse::<QuoteMode>().unwrap(), QuoteMode::Price);
        assert_eq!("Table".parse::<QuoteMode>().unwrap(), QuoteMode::Table);
    }

    #[test]
    fn rejects_unknown_mode_strings() {
        let error = "markdown".parse::<QuoteMode>().expect_err("must reject");
        assert_eq!(error.supplied, "markdown");
    }

    #[test]
    fn terminal_capability_names_follow_the_mode() {
        assert_eq!(QuoteMode::Calc.terminal_capability(), "emit_calc_result");
        assert_eq!(QuoteMode::Price.terminal_capability(), "emit_price_result");
        assert_eq!(QuoteMode::Table.terminal_capability(), "emit_table_result");
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for mode in QuoteMode::ALL {
            assert_eq!(mode.to_string().parse::<QuoteMode>().unwrap(), mode);
        }
    }
}
