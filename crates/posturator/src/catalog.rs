//! Static product listing shown once the assessment completes.

use serde::Serialize;

const SEAT_DESCRIPTION: &str = "Don't let discomfort hinder your gaming experience. Discover the ultimate seat cushion for convenient, non-stop gameplay!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price_cents: u32,
}

impl Product {
    pub fn price_label(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

static PRODUCTS: [Product; 2] = [
    Product {
        id: "posturator",
        name: "Posturator",
        description: SEAT_DESCRIPTION,
        price_cents: 13_000,
    },
    Product {
        id: "posturator-sofa",
        name: "Posturator Sofa",
        description: SEAT_DESCRIPTION,
        price_cents: 12_000,
    },
];

pub fn products() -> &'static [Product] {
    &PRODUCTS
}

pub fn find(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|product| product.id == id)
}
