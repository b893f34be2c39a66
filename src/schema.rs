//! Review table column names.

pub const PRODUCT_ID: &str = "product_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const RATING: &str = "rating";
pub const REVIEW_DATE: &str = "review_date";
pub const REVIEW_TEXT: &str = "review_text";
pub const PRODUCT_ID_UPPER: &str = "product_id_upper";

/// Columns every input must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [PRODUCT_ID, CUSTOMER_ID, RATING, REVIEW_DATE, REVIEW_TEXT];
