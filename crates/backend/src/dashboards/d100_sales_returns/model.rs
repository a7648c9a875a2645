use chrono::NaiveDate;

/// One transaction line after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Not unique: a return and its original sale may share the id
    pub order_id: String,
    pub date: NaiveDate,
    pub product: String,
    pub category: Option<String>,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub total: f64,
    /// Always 0 or 1
    pub returned: u8,
}

/// The loaded dataset. Immutable once built; shared behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    pub records: Vec<OrderRecord>,
    /// Source carried a category column
    pub has_category: bool,
    /// Dates were generated by the loader, not read from the source
    pub synthetic_dates: bool,
}

impl SalesTable {
    pub fn new(records: Vec<OrderRecord>, has_category: bool) -> Self {
        Self {
            records,
            has_category,
            synthetic_dates: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
