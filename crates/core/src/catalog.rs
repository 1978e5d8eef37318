//! Catalog filtering and sorting.
//!
//! The storefront keeps the active catalog in memory and answers listing
//! queries with [`filter_products`]. Anything that looks like a catalog entry
//! (products, combos) implements [`CatalogEntry`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Pricing};

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Featured first, then newest.
    #[default]
    Featured,
    /// Cheapest effective price first.
    PriceAsc,
    /// Most expensive effective price first.
    PriceDesc,
    /// Most recently created first.
    Newest,
    /// Alphabetical by name, case-insensitive.
    Name,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
            Self::Name => "name",
        })
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "newest" => Ok(Self::Newest),
            "name" => Ok(Self::Name),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// What a shopper asked the listing for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Only entries in this category.
    pub category: Option<CategoryId>,
    /// Case-insensitive substring over name, description and category name.
    pub search: Option<String>,
    /// Listing order.
    #[serde(default)]
    pub sort: SortOrder,
    /// Only featured entries.
    #[serde(default)]
    pub featured_only: bool,
}

impl ProductQuery {
    /// The search term, trimmed and lowercased, or `None` if blank.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Read access to the fields catalog queries look at.
pub trait CatalogEntry {
    /// Display name.
    fn name(&self) -> &str;
    /// Long description.
    fn description(&self) -> &str;
    /// Owning category, if any.
    fn category_id(&self) -> Option<CategoryId>;
    /// Owning category's name, if any.
    fn category_name(&self) -> Option<&str>;
    /// List and offer price.
    fn pricing(&self) -> Pricing;
    /// Whether the entry is flagged as featured.
    fn is_featured(&self) -> bool;
    /// Creation time.
    fn created_at(&self) -> DateTime<Utc>;
}

fn matches_needle<T: CatalogEntry>(entry: &T, needle: &str) -> bool {
    entry.name().to_lowercase().contains(needle)
        || entry.description().to_lowercase().contains(needle)
        || entry
            .category_name()
            .is_some_and(|c| c.to_lowercase().contains(needle))
}

/// Whether `entry` passes the query's filters.
#[must_use]
pub fn matches<T: CatalogEntry>(entry: &T, query: &ProductQuery) -> bool {
    if query.featured_only && !entry.is_featured() {
        return false;
    }

    if let Some(category) = query.category
        && entry.category_id() != Some(category)
    {
        return false;
    }

    query
        .needle()
        .is_none_or(|needle| matches_needle(entry, &needle))
}

/// Compare two entries under `order`.
pub fn compare<T: CatalogEntry>(a: &T, b: &T, order: SortOrder) -> Ordering {
    let by_name = || a.name().to_lowercase().cmp(&b.name().to_lowercase());

    match order {
        SortOrder::Featured => b
            .is_featured()
            .cmp(&a.is_featured())
            .then_with(|| b.created_at().cmp(&a.created_at())),
        SortOrder::PriceAsc => a
            .pricing()
            .effective()
            .cmp(&b.pricing().effective())
            .then_with(by_name),
        SortOrder::PriceDesc => b
            .pricing()
            .effective()
            .cmp(&a.pricing().effective())
            .then_with(by_name),
        SortOrder::Newest => b.created_at().cmp(&a.created_at()).then_with(by_name),
        SortOrder::Name => by_name(),
    }
}

/// Filter and sort `entries` for a listing.
///
/// An empty or whitespace-only search matches everything.
pub fn filter_products<'a, T: CatalogEntry>(entries: &'a [T], query: &ProductQuery) -> Vec<&'a T> {
    let mut hits: Vec<&T> = entries.iter().filter(|e| matches(*e, query)).collect();
    hits.sort_by(|a, b| compare(*a, *b, query.sort));
    hits
}

/// Units of a bundle that can be assembled from component stock.
///
/// `components` yields `(stock, quantity per bundle)` pairs. The result is the
/// minimum over components of `stock / quantity`, rounded down. A bundle with
/// no components, or with a zero per-bundle quantity, has no stock.
pub fn bundle_stock<I>(components: I) -> u32
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let mut available: Option<u32> = None;

    for (stock, per_bundle) in components {
        if per_bundle == 0 {
            return 0;
        }
        let units = stock / per_bundle;
        available = Some(available.map_or(units, |a| a.min(units)));
    }

    available.unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    struct Item {
        name: &'static str,
        description: &'static str,
        category: Option<(CategoryId, &'static str)>,
        price: i64,
        offer: Option<i64>,
        featured: bool,
        day: u32,
    }

    impl CatalogEntry for Item {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            self.description
        }
        fn category_id(&self) -> Option<CategoryId> {
            self.category.map(|(id, _)| id)
        }
        fn category_name(&self) -> Option<&str> {
            self.category.map(|(_, name)| name)
        }
        fn pricing(&self) -> Pricing {
            Pricing::new(Decimal::from(self.price), self.offer.map(Decimal::from))
        }
        fn is_featured(&self) -> bool {
            self.featured
        }
        fn created_at(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, self.day, 0, 0, 0).unwrap()
        }
    }

    const PICKLES: CategoryId = CategoryId::new(1);
    const SNACKS: CategoryId = CategoryId::new(2);

    fn catalog() -> Vec<Item> {
        vec![
            Item {
                name: "Mango Pickle",
                description: "Sun-cured raw mango in mustard oil",
                category: Some((PICKLES, "Pickles")),
                price: 300,
                offer: Some(250),
                featured: false,
                day: 3,
            },
            Item {
                name: "Lime Pickle",
                description: "Tangy and hot",
                category: Some((PICKLES, "Pickles")),
                price: 280,
                offer: None,
                featured: true,
                day: 1,
            },
            Item {
                name: "Banana Chips",
                description: "Kerala style, fried in coconut oil",
                category: Some((SNACKS, "Snacks")),
                price: 150,
                offer: Some(200),
                featured: false,
                day: 5,
            },
            Item {
                name: "Gift Card",
                description: "",
                category: None,
                price: 1000,
                offer: None,
                featured: false,
                day: 2,
            },
        ]
    }

    fn names(items: &[&Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.name).collect()
    }

    #[test]
    fn test_category_filter() {
        let items = catalog();
        let query = ProductQuery {
            category: Some(PICKLES),
            sort: SortOrder::Name,
            ..ProductQuery::default()
        };
        assert_eq!(
            names(&filter_products(&items, &query)),
            vec!["Lime Pickle", "Mango Pickle"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_text() {
        let items = catalog();
        let search = |term: &str| {
            let query = ProductQuery {
                search: Some(term.to_owned()),
                sort: SortOrder::Name,
                ..ProductQuery::default()
            };
            names(&filter_products(&items, &query))
        };

        assert_eq!(search("MANGO"), vec!["Mango Pickle"]);
        assert_eq!(search("coconut"), vec!["Banana Chips"]);
        assert_eq!(search("  snacks "), vec!["Banana Chips"]);
        assert_eq!(search("pickles"), vec!["Lime Pickle", "Mango Pickle"]);
        assert!(search("saffron").is_empty());
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let items = catalog();
        let query = ProductQuery {
            search: Some("   ".to_owned()),
            ..ProductQuery::default()
        };
        assert_eq!(filter_products(&items, &query).len(), items.len());
    }

    #[test]
    fn test_search_and_category_combine() {
        let items = catalog();
        let query = ProductQuery {
            category: Some(SNACKS),
            search: Some("pickle".to_owned()),
            ..ProductQuery::default()
        };
        assert!(filter_products(&items, &query).is_empty());
    }

    #[test]
    fn test_featured_only() {
        let items = catalog();
        let query = ProductQuery {
            featured_only: true,
            ..ProductQuery::default()
        };
        assert_eq!(names(&filter_products(&items, &query)), vec!["Lime Pickle"]);
    }

    #[test]
    fn test_sort_orders() {
        let items = catalog();
        let sorted = |sort| {
            let query = ProductQuery {
                sort,
                ..ProductQuery::default()
            };
            names(&filter_products(&items, &query))
        };

        assert_eq!(
            sorted(SortOrder::Featured),
            vec!["Lime Pickle", "Banana Chips", "Mango Pickle", "Gift Card"]
        );
        // Banana Chips' offer is above list price, so it sells at 150.
        assert_eq!(
            sorted(SortOrder::PriceAsc),
            vec!["Banana Chips", "Mango Pickle", "Lime Pickle", "Gift Card"]
        );
        assert_eq!(
            sorted(SortOrder::PriceDesc),
            vec!["Gift Card", "Lime Pickle", "Mango Pickle", "Banana Chips"]
        );
        assert_eq!(
            sorted(SortOrder::Newest),
            vec!["Banana Chips", "Mango Pickle", "Gift Card", "Lime Pickle"]
        );
        assert_eq!(
            sorted(SortOrder::Name),
            vec!["Banana Chips", "Gift Card", "Lime Pickle", "Mango Pickle"]
        );
    }

    #[test]
    fn test_bundle_stock_is_limited_by_scarcest_component() {
        assert_eq!(bundle_stock([(10, 2), (7, 1)]), 5);
        assert_eq!(bundle_stock([(10, 3), (100, 1)]), 3);
        assert_eq!(bundle_stock([(1, 2), (100, 1)]), 0);
        assert_eq!(bundle_stock([(5, 0)]), 0);
        assert_eq!(bundle_stock(std::iter::empty()), 0);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("price_desc".parse::<SortOrder>(), Ok(SortOrder::PriceDesc));
        assert!("cheapest".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::PriceAsc.to_string(), "price_asc");
    }
}
