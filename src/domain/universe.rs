//! Symbol universe: parsing, validation and resolution from configuration.
//!
//! Sources in priority order: an inline `[universe] symbols` list, a
//! `[universe] symbols_file` CSV, then the built-in S&P 500 constituents.

use crate::domain::error::TraderError;
use crate::ports::config_port::ConfigPort;
use crate::ports::universe_port::UniversePort;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    pub symbols: Vec<String>,
}

impl Universe {
    pub fn new(symbols: Vec<String>) -> Result<Self, UniverseError> {
        if symbols.is_empty() {
            return Err(UniverseError::Empty);
        }
        let mut seen = HashSet::new();
        for symbol in &symbols {
            validate_symbol(symbol)?;
            if !seen.insert(symbol.as_str()) {
                return Err(UniverseError::DuplicateSymbol(symbol.clone()));
            }
        }
        Ok(Self { symbols })
    }

    pub fn sp500() -> Self {
        Self {
            symbols: SP500_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseSource {
    Inline,
    File(String),
    BuiltIn,
}

impl fmt::Display for UniverseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniverseSource::Inline => write!(f, "[universe] symbols"),
            UniverseSource::File(path) => write!(f, "{}", path),
            UniverseSource::BuiltIn => write!(f, "built-in S&P 500 list"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("universe is empty")]
    Empty,
}

fn validate_symbol(symbol: &str) -> Result<(), UniverseError> {
    let valid = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == ' ');
    if valid {
        Ok(())
    } else {
        Err(UniverseError::InvalidSymbol(symbol.to_string()))
    }
}

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = normalize_symbol(token);
        if symbol.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        validate_symbol(&symbol)?;
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn resolve_universe(
    config: &dyn ConfigPort,
    files: &dyn UniversePort,
) -> Result<(Universe, UniverseSource), TraderError> {
    if let Some(inline) = config
        .get_string("universe", "symbols")
        .filter(|s| !s.trim().is_empty())
    {
        let universe = Universe::new(parse_symbols(&inline)?)?;
        return Ok((universe, UniverseSource::Inline));
    }

    if let Some(path) = config
        .get_string("universe", "symbols_file")
        .filter(|s| !s.trim().is_empty())
    {
        let symbols = files
            .load_symbols(&path)?
            .iter()
            .map(|s| normalize_symbol(s))
            .collect();
        let universe = Universe::new(symbols)?;
        return Ok((universe, UniverseSource::File(path)));
    }

    Ok((Universe::sp500(), UniverseSource::BuiltIn))
}

/// S&P 500 constituents used when no universe is configured.
pub const SP500_SYMBOLS: &[&str] = &[
    "MMM", "AOS", "ABT", "ABBV", "ABMD", "ACN", "ATVI", "ADM", "ADBE", "ADP", "AAP", "AES",
    "AFL", "A", "AIG", "APD", "AKAM", "ALK", "ALB", "ARE", "ALGN", "ALLE", "LNT", "ALL",
    "GOOGL", "GOOG", "MO", "AMZN", "AMCR", "AMD", "AEE", "AAL", "AEP", "AXP", "AMT", "AWK",
    "AMP", "ABC", "AME", "AMGN", "APH", "ADI", "ANSS", "ANTM", "AON", "APA", "AAPL", "AMAT",
    "APTV", "ANET", "AIZ", "T", "ATO", "ADSK", "AZO", "AVB", "AVY", "BKR", "BLL", "BAC",
    "BBWI", "BAX", "BDX", "WRB", "BRK.B", "BBY", "BIO", "TECH", "BIIB", "BLK", "BK", "BA",
    "BKNG", "BWA", "BXP", "BSX", "BMY", "AVGO", "BR", "BRO", "BF.B", "CHRW", "CDNS", "CZR",
    "CPT", "CPB", "COF", "CAH", "KMX", "CCL", "CARR", "CTLT", "CAT", "CBOE", "CBRE", "CDW",
    "CE", "CNC", "CNP", "CDAY", "CERN", "CF", "CRL", "SCHW", "CHTR", "CVX", "CMG", "CB", "CHD",
    "CI", "CINF", "CTAS", "CSCO", "C", "CFG", "CTXS", "CLX", "CME", "CMS", "KO", "CTSH", "CL",
    "CMCSA", "CMA", "CAG", "COP", "ED", "STZ", "CEG", "COO", "CPRT", "GLW", "CTVA", "COST",
    "CTRA", "CCI", "CSX", "CMI", "CVS", "DHI", "DHR", "DRI", "DVA", "DE", "DAL", "XRAY", "DVN",
    "DXCM", "FANG", "DLR", "DFS", "DISH", "DIS", "DG", "DLTR", "D", "DPZ", "DOV", "DOW", "DTE",
    "DUK", "DRE", "DD", "DXC", "EMN", "ETN", "EBAY", "ECL", "EIX", "EW", "EA", "EMR", "ENPH",
    "ETR", "EOG", "EPAM", "EFX", "EQIX", "EQR", "ESS", "EL", "ETSY", "RE", "EVRG", "ES", "EXC",
    "EXPE", "EXPD", "EXR", "XOM", "FFIV", "FDS", "FAST", "FRT", "FDX", "FITB", "FRC", "FE",
    "FIS", "FISV", "FLT", "FMC", "F", "FTNT", "FTV", "FBHS", "FOXA", "FOX", "BEN", "FCX",
    "AJG", "GRMN", "IT", "GE", "GNRC", "GD", "GIS", "GPC", "GILD", "GL", "GPN", "GM", "GS",
    "GWW", "HAL", "HIG", "HAS", "HCA", "PEAK", "HSIC", "HSY", "HES", "HPE", "HLT", "HOLX",
    "HD", "HON", "HRL", "HST", "HWM", "HPQ", "HUM", "HII", "HBAN", "IEX", "IDXX", "ITW",
    "ILMN", "INCY", "IR", "INTC", "ICE", "IBM", "IP", "IPG", "IFF", "INTU", "ISRG", "IVZ",
    "IPGP", "IQV", "IRM", "JBHT", "JKHY", "J", "JNJ", "JCI", "JPM", "JNPR", "K", "KEY", "KEYS",
    "KMB", "KIM", "KMI", "KLAC", "KHC", "KR", "LHX", "LH", "LRCX", "LW", "LVS", "LDOS", "LEN",
    "LLY", "LNC", "LIN", "LYV", "LKQ", "LMT", "L", "LOW", "LUMN", "LYB", "MTB", "MRO", "MPC",
    "MKTX", "MAR", "MMC", "MLM", "MAS", "MA", "MTCH", "MKC", "MCD", "MCK", "MDT", "MRK", "FB",
    "MET", "MTD", "MGM", "MCHP", "MU", "MSFT", "MAA", "MRNA", "MHK", "MOH", "TAP", "MDLZ",
    "MPWR", "MNST", "MCO", "MS", "MOS", "MSI", "MSCI", "NDAQ", "NTAP", "NFLX", "NWL", "NEM",
    "NWSA", "NWS", "NEE", "NLSN", "NKE", "NI", "NDSN", "NSC", "NTRS", "NOC", "NLOK", "NCLH",
    "NRG", "NUE", "NVDA", "NVR", "NXPI", "ORLY", "OXY", "ODFL", "OMC", "OKE", "ORCL", "OGN",
    "OTIS", "PCAR", "PKG", "PARA", "PH", "PAYX", "PAYC", "PYPL", "PENN", "PNR", "PEP", "PKI",
    "PFE", "PM", "PSX", "PNW", "PXD", "PNC", "POOL", "PPG", "PPL", "PFG", "PG", "PGR", "PLD",
    "PRU", "PEG", "PTC", "PSA", "PHM", "PVH", "QRVO", "PWR", "QCOM", "DGX", "RL", "RJF", "RTX",
    "O", "REG", "REGN", "RF", "RSG", "RMD", "RHI", "ROK", "ROL", "ROP", "ROST", "RCL", "SPGI",
    "CRM", "SBAC", "SLB", "STX", "SEE", "SRE", "NOW", "SHW", "SBNY", "SPG", "SWKS", "SJM",
    "SNA", "SEDG", "SO", "LUV", "SWK", "SBUX", "STT", "STE", "SYK", "SIVB", "SYF", "SNPS",
    "SYY", "TMUS", "TROW", "TTWO", "TPR", "TGT", "TEL", "TDY", "TFX", "TER", "TSLA", "TXN",
    "TXT", "TMO", "TJX", "TSCO", "TT", "TDG", "TRV", "TRMB", "TFC", "TWTR", "TYL", "TSN",
    "USB", "UDR", "ULTA", "UAA", "UA", "UNP", "UAL", "UNH", "UPS", "URI", "UHS", "VLO", "VTR",
    "VRSN", "VRSK", "VZ", "VRTX", "VFC", "VTRS", "V", "VNO", "VMC", "WAB", "WMT", "WBA", "WBD",
    "WM", "WAT", "WEC", "WFC", "WELL", "WST", "WDC", "WRK", "WY", "WHR", "WMB", "WTW", "WYNN",
    "XEL", "XYL", "YUM", "ZBRA", "ZBH", "ZION", "ZTS",
];
