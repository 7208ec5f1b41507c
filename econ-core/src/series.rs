//! Series descriptors and the built-in indicator catalog.
//!
//! A descriptor pairs a FRED series identifier with the display name used as
//! the output column header and the per-series file name.

use serde::{Deserialize, Serialize};

/// One configured series: FRED identifier plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub id: String,
    pub name: String,
}

impl SeriesDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Parse the `ID=Display name` form used on the command line.
    pub fn parse_pair(s: &str) -> Option<Self> {
        let (id, name) = s.split_once('=')?;
        let (id, name) = (id.trim(), name.trim());
        if id.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(id, name))
    }
}

const CATALOG: &[(&str, &str)] = &[
    ("UNRATE", "unemployment Ratio"),
    ("SAHMREALTIME", "Real-time Sahm Rule Recession Indicator"),
    ("ICSA", "Initial Claims"),
    ("USCONS", "All Employees, Construction"),
    ("JTSJOL", "Job Openings: Total Nonfarm"),
    ("DTWEXBGS", "Dollar index"),
    ("DCOILWTICO", "WTI Crude Oil"),
    ("CES4348400001", "All Employees, Truck Transportation"),
    ("M2SL", "M2"),
    ("M2V", "M2V"),
    ("GDPC1", "Real GDP"),
    ("AMTMNO", "PMI - New Orders"),
    ("BAMLH0A0HYM2EY", "High-Yield"),
    ("DGS10", "10 year treasury"),
    ("DGS2", "2 year treasury"),
    ("FEDFUNDS", "Federal Funds Effective Rate"),
    (
        "MORTGAGE30US",
        "30-Year Fixed Rate Mortgage Average in the United States",
    ),
    (
        "CPIAUCSL",
        "Consumer Price Index for All Urban Consumers: All Items in U.S. City Average",
    ),
    ("COMREPUSQ159N", "Commercial Real Estate Prices"),
    ("HPIPONM226S", "House Price Index (Purchase only)"),
    ("SP500", "s&p 500"),
    ("NASDAQCOM", "NASDAQ Composite Index"),
    ("DJCA", "Dow Jones Composite Average"),
];

/// The default set of macro indicators: labor market, money supply, rates,
/// prices, housing and equity indices.
pub fn default_catalog() -> Vec<SeriesDescriptor> {
    CATALOG
        .iter()
        .map(|(id, name)| SeriesDescriptor::new(*id, *name))
        .collect()
}
