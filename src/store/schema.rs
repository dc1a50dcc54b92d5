pub const USERS: &str = "users";
pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";
pub const PRODUCT_FILES: &str = "product_files";

/// Relationship field pointing at another collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub field: &'static str,
    pub collection: &'static str,
}

const PRODUCT_RELATIONS: &[Relation] = &[
    Relation { field: "user", collection: USERS },
    Relation { field: "product_files", collection: PRODUCT_FILES },
];

const ORDER_RELATIONS: &[Relation] = &[
    Relation { field: "user", collection: USERS },
    Relation { field: "products", collection: PRODUCTS },
];

const PRODUCT_FILE_RELATIONS: &[Relation] = &[
    Relation { field: "user", collection: USERS },
];

pub const ALL_COLLECTIONS: &[&str] = &[USERS, PRODUCTS, ORDERS, PRODUCT_FILES];

pub fn relations(collection: &str) -> &'static [Relation] {
    match collection {
        PRODUCTS => PRODUCT_RELATIONS,
        ORDERS => ORDER_RELATIONS,
        PRODUCT_FILES => PRODUCT_FILE_RELATIONS,
        _ => &[],
    }
}
