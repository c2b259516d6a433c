use super::types::{AllocationParameters, AllocationResult, AllocationSlice, AssetClass};

const PORTFOLIO_CLASSES: [AssetClass; 8] = [
    AssetClass::DomesticStocks,
    AssetClass::InternationalStocks,
    AssetClass::DomesticBonds,
    AssetClass::InternationalBonds,
    AssetClass::Reits,
    AssetClass::Commodities,
    AssetClass::Alternatives,
    AssetClass::Cash,
];

impl AssetClass {
    pub fn label(self) -> &'static str {
        match self {
            AssetClass::DomesticStocks => "Domestic Stocks",
            AssetClass::InternationalStocks => "International Stocks",
            AssetClass::DomesticBonds => "Domestic Bonds",
            AssetClass::InternationalBonds => "International Bonds",
            AssetClass::Reits => "REITs",
            AssetClass::Commodities => "Commodities",
            AssetClass::Alternatives => "Alternatives",
            AssetClass::Cash => "Cash",
        }
    }

    /// Long-run nominal return assumption, percent per year.
    pub fn expected_return_percent(self) -> f64 {
        match self {
            AssetClass::DomesticStocks => 10.0,
            AssetClass::InternationalStocks => 8.5,
            AssetClass::DomesticBonds => 4.5,
            AssetClass::InternationalBonds => 3.5,
            AssetClass::Reits => 8.0,
            AssetClass::Commodities => 5.5,
            AssetClass::Alternatives => 7.0,
            AssetClass::Cash => 2.0,
        }
    }

    /// Annualized volatility assumption, percent.
    pub fn risk_percent(self) -> f64 {
        match self {
            AssetClass::DomesticStocks => 15.0,
            AssetClass::InternationalStocks => 17.0,
            AssetClass::DomesticBonds => 5.0,
            AssetClass::InternationalBonds => 7.0,
            AssetClass::Reits => 18.0,
            AssetClass::Commodities => 16.0,
            AssetClass::Alternatives => 12.0,
            AssetClass::Cash => 0.5,
        }
    }
}

/// Builds a model portfolio from risk tolerance, age and horizon.
///
/// The equity share starts at 30% plus 7 points per unit of risk tolerance,
/// gains an age adjustment of up to 30 points for younger investors, and is
/// pulled back for horizons under ten years (never below a 20% floor). The
/// rest is carved into alternatives, REITs and commodities where enabled,
/// each against its own cap, with the remainder split between bonds and a
/// horizon-scaled cash reserve. Final weights are rounded to one decimal and
/// any rounding residue lands on cash.
pub fn optimize_allocation(params: &AllocationParameters) -> AllocationResult {
    let risk = params.risk_tolerance as f64;
    let age = params.age as f64;

    let mut stock_percent = 30.0 + risk * 7.0;
    let age_adjustment = (100.0 - age - (10.0 - risk)).clamp(0.0, 30.0);
    stock_percent = (stock_percent + age_adjustment).min(100.0);
    if params.investment_horizon_years < 5 {
        stock_percent = (stock_percent - 20.0).max(20.0);
    } else if params.investment_horizon_years < 10 {
        stock_percent = (stock_percent - 10.0).max(30.0);
    }

    let (domestic_stocks, international_stocks) = if params.include_international {
        (stock_percent * 0.6, stock_percent * 0.4)
    } else {
        (stock_percent, 0.0)
    };

    let mut remaining = (100.0 - stock_percent).max(0.0);

    let mut alternatives = 0.0;
    if params.include_alternatives {
        alternatives = (remaining * 0.3).min(15.0);
        remaining -= alternatives;
    }
    let mut reits = 0.0;
    if params.include_reit {
        reits = (remaining * 0.3).min(15.0);
        remaining -= reits;
    }
    let mut commodities = 0.0;
    if params.include_commodities {
        commodities = (remaining * 0.2).min(10.0);
        remaining -= commodities;
    }

    let mut domestic_bonds = 0.0;
    let mut international_bonds = 0.0;
    let cash;
    if params.include_bonds {
        let cash_share = if params.investment_horizon_years < 5 {
            0.4
        } else if params.investment_horizon_years < 10 {
            0.2
        } else {
            0.1
        };
        cash = remaining * cash_share;
        let bonds = remaining - cash;
        if params.include_international {
            domestic_bonds = bonds * 0.7;
            international_bonds = bonds * 0.3;
        } else {
            domestic_bonds = bonds;
        }
    } else {
        cash = remaining;
    }

    let mut percents = [
        round_tenth(domestic_stocks),
        round_tenth(international_stocks),
        round_tenth(domestic_bonds),
        round_tenth(international_bonds),
        round_tenth(reits),
        round_tenth(commodities),
        round_tenth(alternatives),
        round_tenth(cash),
    ];
    let total: f64 = percents.iter().sum();
    percents[7] = (percents[7] + (100.0 - total)).max(0.0);

    let slices: Vec<AllocationSlice> = PORTFOLIO_CLASSES
        .iter()
        .zip(percents.iter())
        .map(|(class, percent)| AllocationSlice {
            asset_class: *class,
            label: class.label(),
            percent: *percent,
            dollar_amount: percent / 100.0 * params.investment_amount,
        })
        .collect();

    let expected_return_percent = slices
        .iter()
        .map(|slice| slice.percent / 100.0 * slice.asset_class.expected_return_percent())
        .sum::<f64>();
    // Treats class volatilities as uncorrelated.
    let risk_percent = slices
        .iter()
        .map(|slice| {
            let contribution = slice.percent / 100.0 * slice.asset_class.risk_percent();
            contribution * contribution
        })
        .sum::<f64>()
        .sqrt();

    AllocationResult {
        slices,
        expected_return_percent,
        risk_percent,
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
