//! Demo data for local development.
//!
//! # Usage
//!
//! ```bash
//! larder migrate && larder seed
//! ```
//!
//! Loads a small pickle shop: three categories, a handful of products, one
//! combo, the home page hero, a banner and one post of each kind. The seed
//! refuses to run against a database that already has categories.

use larder_core::{CategoryId, PostKind, ProductId};
use larder_db::{
    BannerInput, BannerRepository, CategoryInput, CategoryRepository, ComboInput,
    ComboItemInput, ComboRepository, ContentRepository, PostInput, PostRepository, ProductInput,
    ProductRepository, RepositoryError,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Could not reach the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// A record was rejected.
    #[error("Seed failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// (slug, name)
const CATEGORIES: [(&str, &str); 3] = [
    ("pickles", "Pickles"),
    ("chutneys", "Chutneys"),
    ("spice-blends", "Spice Blends"),
];

struct DemoProduct {
    category: &'static str,
    slug: &'static str,
    name: &'static str,
    description: &'static str,
    /// Price in paise.
    price: i64,
    offer: Option<i64>,
    stock: u32,
    featured: bool,
    new: bool,
}

const PRODUCTS: [DemoProduct; 6] = [
    DemoProduct {
        category: "pickles",
        slug: "mango-avakaya",
        name: "Mango Avakaya",
        description: "Raw mango cut with the stone, mustard and cold-pressed sesame oil.",
        price: 34_900,
        offer: Some(29_900),
        stock: 40,
        featured: true,
        new: false,
    },
    DemoProduct {
        category: "pickles",
        slug: "lime-chilli",
        name: "Lime & Green Chilli",
        description: "Sun-cured lime quarters with slit green chillies.",
        price: 24_900,
        offer: None,
        stock: 25,
        featured: false,
        new: false,
    },
    DemoProduct {
        category: "pickles",
        slug: "garlic-pickle",
        name: "Garlic Pickle",
        description: "Whole cloves in a tamarind and red chilli masala.",
        price: 27_900,
        offer: None,
        stock: 3,
        featured: false,
        new: true,
    },
    DemoProduct {
        category: "chutneys",
        slug: "tomato-thokku",
        name: "Tomato Thokku",
        description: "Slow-cooked tomato relish with fenugreek.",
        price: 19_900,
        offer: Some(17_900),
        stock: 60,
        featured: true,
        new: false,
    },
    DemoProduct {
        category: "chutneys",
        slug: "gongura",
        name: "Gongura Chutney",
        description: "Sorrel leaves ground with roasted chillies.",
        price: 22_900,
        offer: None,
        stock: 0,
        featured: false,
        new: false,
    },
    DemoProduct {
        category: "spice-blends",
        slug: "podi",
        name: "Idli Podi",
        description: "Roasted lentil and sesame powder.",
        price: 14_900,
        offer: None,
        stock: 80,
        featured: false,
        new: true,
    },
];

/// Load the demo data.
///
/// # Errors
///
/// Fails if the database is unreachable or a record is rejected.
pub async fn run() -> Result<(), SeedError> {
    let pool = connect().await?;

    if !CategoryRepository::new(&pool).list_all().await?.is_empty() {
        tracing::warn!("Catalog already has categories; skipping seed");
        return Ok(());
    }

    let categories = seed_categories(&pool).await?;
    let products = seed_products(&pool, &categories).await?;
    seed_combo(&pool, &products).await?;
    seed_content(&pool).await?;

    tracing::info!("Seed complete!");
    Ok(())
}

async fn seed_categories(
    pool: &PgPool,
) -> Result<Vec<(&'static str, CategoryId)>, SeedError> {
    let repo = CategoryRepository::new(pool);
    let mut created = Vec::with_capacity(CATEGORIES.len());
    for (sort_order, (slug, name)) in (0..).zip(CATEGORIES) {
        let category = repo
            .create(&CategoryInput {
                slug: slug.to_owned(),
                name: name.to_owned(),
                sort_order,
                is_active: true,
            })
            .await?;
        created.push((slug, category.id));
    }
    tracing::info!(count = created.len(), "Seeded categories");
    Ok(created)
}

async fn seed_products(
    pool: &PgPool,
    categories: &[(&'static str, CategoryId)],
) -> Result<Vec<(&'static str, ProductId)>, SeedError> {
    let repo = ProductRepository::new(pool);
    let mut created = Vec::with_capacity(PRODUCTS.len());
    for demo in &PRODUCTS {
        let category_id = categories
            .iter()
            .find(|(slug, _)| *slug == demo.category)
            .map(|(_, id)| *id);
        let product = repo
            .create(&ProductInput {
                slug: demo.slug.to_owned(),
                name: demo.name.to_owned(),
                description: demo.description.to_owned(),
                category_id,
                price: Decimal::new(demo.price, 2),
                offer_price: demo.offer.map(|paise| Decimal::new(paise, 2)),
                stock: demo.stock,
                is_active: true,
                is_featured: demo.featured,
                is_new: demo.new,
                image_url: Some(format!("/images/products/{}.jpg", demo.slug)),
            })
            .await?;
        created.push((demo.slug, product.id));
    }
    tracing::info!(count = created.len(), "Seeded products");
    Ok(created)
}

async fn seed_combo(
    pool: &PgPool,
    products: &[(&'static str, ProductId)],
) -> Result<(), SeedError> {
    let items: Vec<ComboItemInput> = ["mango-avakaya", "tomato-thokku", "podi"]
        .iter()
        .filter_map(|wanted| products.iter().find(|(slug, _)| slug == wanted))
        .map(|(_, product_id)| ComboItemInput {
            product_id: *product_id,
            quantity: 1,
        })
        .collect();

    let combo = ComboRepository::new(pool)
        .create(&ComboInput {
            slug: "breakfast-trio".to_owned(),
            name: "Breakfast Trio".to_owned(),
            description: "Avakaya, thokku and podi for the idli table.".to_owned(),
            price: Decimal::new(59_900, 2),
            is_active: true,
            is_featured: true,
            image_url: Some("/images/combos/breakfast-trio.jpg".to_owned()),
            items,
        })
        .await?;
    tracing::info!(combo = %combo.slug, "Seeded combo");
    Ok(())
}

async fn seed_content(pool: &PgPool) -> Result<(), SeedError> {
    let content = ContentRepository::new(pool);
    for (section, value) in [
        ("title", "Pickled the slow way"),
        ("subtitle", "Small batches from our kitchen, shipped across India."),
        ("cta_label", "Shop pickles"),
        ("cta_link", "/shop?category=pickles"),
    ] {
        content.upsert("hero", section, value).await?;
    }
    content
        .upsert("about", "body", "Larder started as one family's pantry.")
        .await?;

    BannerRepository::new(pool)
        .create(&BannerInput {
            title: "Free shipping over ₹999".to_owned(),
            subtitle: None,
            image_url: "/images/banners/shipping.jpg".to_owned(),
            link_url: Some("/shop".to_owned()),
            placement: "home".to_owned(),
            sort_order: 0,
            is_active: true,
        })
        .await?;

    let posts = PostRepository::new(pool);
    for (kind, slug, title) in [
        (PostKind::Blog, "why-sesame-oil", "Why we only use sesame oil"),
        (PostKind::Press, "local-paper-feature", "Larder in the weekend paper"),
        (PostKind::Careers, "kitchen-assistant", "Kitchen assistant"),
    ] {
        posts
            .create(&PostInput {
                kind,
                slug: slug.to_owned(),
                title: title.to_owned(),
                summary: String::new(),
                body: String::new(),
                published_at: None,
                is_published: true,
            })
            .await?;
    }
    tracing::info!("Seeded storefront content");
    Ok(())
}
