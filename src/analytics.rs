//! Analytics engine: four fixed aggregates over the transformed reviews.
//!
//! Every query is a pure function of the transformed table, so they can be
//! evaluated in any order with identical results.

use crate::error::Result;
use crate::schema::{CUSTOMER_ID, PRODUCT_ID_UPPER, RATING, REVIEW_DATE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const AVERAGE_RATING: &str = "average_rating";
pub const REVIEW_COUNT: &str = "review_count";
pub const TOTAL_REVIEWS: &str = "total_reviews";
pub const AVG_RATING: &str = "avg_rating";
pub const RATING_COUNT: &str = "rating_count";
pub const PERCENTAGE: &str = "percentage";

/// Number of customers kept by [`AnalyticsQuery::TopCustomers`]
pub const TOP_CUSTOMERS_LIMIT: IdxSize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsQuery {
    /// Mean rating and review count per uppercased product id
    ProductAnalytics,
    /// Reviews per calendar day
    DateWiseReviews,
    /// Five customers with the most reviews
    TopCustomers,
    /// Count and share of each positive rating value
    RatingDistribution,
}

impl AnalyticsQuery {
    pub const ALL: [AnalyticsQuery; 4] = [
        AnalyticsQuery::ProductAnalytics,
        AnalyticsQuery::DateWiseReviews,
        AnalyticsQuery::TopCustomers,
        AnalyticsQuery::RatingDistribution,
    ];

    /// Sub-location the result is written under
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsQuery::ProductAnalytics => "product_analytics",
            AnalyticsQuery::DateWiseReviews => "date_wise_reviews",
            AnalyticsQuery::TopCustomers => "top_customers",
            AnalyticsQuery::RatingDistribution => "rating_distribution",
        }
    }

    pub fn output_columns(&self) -> &'static [&'static str] {
        match self {
            AnalyticsQuery::ProductAnalytics => &[PRODUCT_ID_UPPER, AVERAGE_RATING, REVIEW_COUNT],
            AnalyticsQuery::DateWiseReviews => &[REVIEW_DATE, REVIEW_COUNT],
            AnalyticsQuery::TopCustomers => &[CUSTOMER_ID, TOTAL_REVIEWS, AVG_RATING],
            AnalyticsQuery::RatingDistribution => &[RATING, RATING_COUNT, PERCENTAGE],
        }
    }

    pub fn run(&self, reviews: &DataFrame) -> Result<DataFrame> {
        let reviews = reviews.clone().lazy();
        match self {
            AnalyticsQuery::ProductAnalytics => product_analytics(reviews),
            AnalyticsQuery::DateWiseReviews => date_wise_reviews(reviews),
            AnalyticsQuery::TopCustomers => top_customers(reviews),
            AnalyticsQuery::RatingDistribution => rating_distribution(reviews),
        }
    }
}

impl fmt::Display for AnalyticsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn descending_then_key() -> SortMultipleOptions {
    SortMultipleOptions::default()
        .with_order_descendings([true, false])
        .with_nulls_last(true)
}

/// Group by `product_id_upper`, highest average first
pub fn product_analytics(reviews: LazyFrame) -> Result<DataFrame> {
    let df = reviews
        .group_by([col(PRODUCT_ID_UPPER)])
        .agg([
            col(RATING).mean().alias(AVERAGE_RATING),
            len().cast(DataType::Int64).alias(REVIEW_COUNT),
        ])
        .sort_by_exprs([col(AVERAGE_RATING), col(PRODUCT_ID_UPPER)], descending_then_key())
        .select([col(PRODUCT_ID_UPPER), col(AVERAGE_RATING), col(REVIEW_COUNT)])
        .collect()?;
    Ok(df)
}

/// Reviews per day, most recent day first; rows without a date are ignored
pub fn date_wise_reviews(reviews: LazyFrame) -> Result<DataFrame> {
    let df = reviews
        .filter(col(REVIEW_DATE).is_not_null())
        .group_by([col(REVIEW_DATE)])
        .agg([len().cast(DataType::Int64).alias(REVIEW_COUNT)])
        .sort_by_exprs(
            [col(REVIEW_DATE)],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()?;
    Ok(df)
}

/// The most active customers by review count
pub fn top_customers(reviews: LazyFrame) -> Result<DataFrame> {
    let df = reviews
        .filter(col(CUSTOMER_ID).is_not_null())
        .group_by([col(CUSTOMER_ID)])
        .agg([
            len().cast(DataType::Int64).alias(TOTAL_REVIEWS),
            col(RATING).mean().alias(AVG_RATING),
        ])
        .sort_by_exprs([col(TOTAL_REVIEWS), col(CUSTOMER_ID)], descending_then_key())
        .limit(TOP_CUSTOMERS_LIMIT)
        .collect()?;
    Ok(df)
}

/// Histogram of positive ratings with each value's share of the total
pub fn rating_distribution(reviews: LazyFrame) -> Result<DataFrame> {
    let mut df = reviews
        .filter(col(RATING).is_not_null().and(col(RATING).gt(lit(0))))
        .group_by([col(RATING)])
        .agg([len().cast(DataType::Int64).alias(RATING_COUNT)])
        .sort_by_exprs(
            [col(RATING)],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()?;

    let counts: Vec<i64> = df
        .column(RATING_COUNT)?
        .i64()?
        .into_iter()
        .map(|c| c.unwrap_or(0))
        .collect();

    df.with_column(Series::new(PERCENTAGE, rating_percentages(&counts)))?;
    Ok(df)
}

/// Each count as a percentage of the sum, rounded half-up to 2 decimals.
///
/// Computed on integers (hundredths of a percent) so results do not depend
/// on binary float representation.
pub fn rating_percentages(counts: &[i64]) -> Vec<f64> {
    let total: i128 = counts.iter().map(|&c| c as i128).sum();
    if total <= 0 {
        return vec![0.0; counts.len()];
    }

    counts
        .iter()
        .map(|&count| {
            let hundredths = (count as i128 * 20_000 + total) / (2 * total);
            hundredths as f64 / 100.0
        })
        .collect()
}
