//! Configuration for an engineering run.

use drought_calendar::YearMonth;

use crate::error::EngineerError;

/// How the test partition is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitStrategy {
    /// Whole calendar years are reserved for testing.
    Years {
        /// Years whose every month is a test target.
        test_years: Vec<i32>,
        /// Years allowed as training targets. `None` means every year not
        /// in `test_years`.
        train_years: Option<Vec<i32>>,
    },
    /// Individual months are reserved for testing.
    Timesteps {
        /// Months that are test targets.
        test: Vec<YearMonth>,
        /// Allow-list of training target months. `None` allows every month.
        train: Option<Vec<YearMonth>>,
    },
}

impl SplitStrategy {
    /// Year split with the training years implied.
    pub fn test_years(years: Vec<i32>) -> Self {
        Self::Years {
            test_years: years,
            train_years: None,
        }
    }

    fn validate(&self) -> Result<(), EngineerError> {
        let empty = match self {
            Self::Years { test_years, .. } => test_years.is_empty(),
            Self::Timesteps { test, .. } => test.is_empty(),
        };
        if empty {
            return Err(EngineerError::InvalidConfig {
                reason: "at least one test year or timestep is required".to_string(),
            });
        }
        if let Self::Years {
            test_years,
            train_years: Some(train),
        } = self
            && let Some(y) = train.iter().find(|y| test_years.contains(y))
        {
            return Err(EngineerError::InvalidConfig {
                reason: format!("year {y} is both a train and a test year"),
            });
        }
        Ok(())
    }
}

/// Configuration for [`engineer`](crate::engineer).
///
/// # Example
///
/// ```
/// use drought_engineer::{EngineerConfig, SplitStrategy};
///
/// let config = EngineerConfig::new(SplitStrategy::test_years(vec![2018]))
///     .with_target_variable("VCI")
///     .with_pred_months(3)
///     .with_expected_length(Some(3));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EngineerConfig {
    target_variable: String,
    pred_months: u32,
    expected_length: Option<usize>,
    split: SplitStrategy,
}

impl EngineerConfig {
    /// Creates a configuration for the given split.
    ///
    /// Defaults: `target_variable = "VHI"`, `pred_months = 12`,
    /// `expected_length = Some(12)`.
    pub fn new(split: SplitStrategy) -> Self {
        Self {
            target_variable: "VHI".to_string(),
            pred_months: 12,
            expected_length: Some(12),
            split,
        }
    }

    /// Sets the variable to forecast.
    pub fn with_target_variable(mut self, name: impl Into<String>) -> Self {
        self.target_variable = name.into();
        self
    }

    /// Sets the number of months of input history.
    pub fn with_pred_months(mut self, n: u32) -> Self {
        self.pred_months = n;
        self
    }

    /// Sets the required input window length; `None` disables the check.
    pub fn with_expected_length(mut self, n: Option<usize>) -> Self {
        self.expected_length = n;
        self
    }

    /// Returns the target variable.
    pub fn target_variable(&self) -> &str {
        &self.target_variable
    }

    /// Returns the number of history months.
    pub fn pred_months(&self) -> u32 {
        self.pred_months
    }

    /// Returns the required window length.
    pub fn expected_length(&self) -> Option<usize> {
        self.expected_length
    }

    /// Returns the split strategy.
    pub fn split(&self) -> &SplitStrategy {
        &self.split
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineerError::InvalidConfig`] if `pred_months` is zero, the
    /// target variable is empty, or the split has no test targets or overlaps.
    pub fn validate(&self) -> Result<(), EngineerError> {
        if self.pred_months == 0 {
            return Err(EngineerError::InvalidConfig {
                reason: "pred_months must be at least 1".to_string(),
            });
        }
        if self.target_variable.is_empty() {
            return Err(EngineerError::InvalidConfig {
                reason: "target_variable must not be empty".to_string(),
            });
        }
        self.split.validate()
    }
}
