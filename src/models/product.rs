//! Print-on-demand product bodies: the inbound request and the reshaped
//! fulfillment API payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const DEFAULT_X: f64 = 0.5;
const DEFAULT_Y: f64 = 0.5;
const DEFAULT_SCALE: f64 = 1.0;

/// The print position that carries the customer's artwork
pub const FRONT_POSITION: &str = "front";

/// Inbound `create-product` body
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpec {
    /// Catalog blueprint (product type)
    #[serde(deserialize_with = "lenient_id")]
    pub blueprint_id: u64,
    /// Print provider for the blueprint
    #[serde(deserialize_with = "lenient_id")]
    pub provider_id: u64,
    /// File name given to the uploaded artwork
    pub file_name: String,
    /// Public url of the artwork
    pub image_url: String,
    /// Title and description of the product
    pub product_name: String,
    /// Variant pricing
    pub price: Pricing,
    /// Positions that receive an image
    #[serde(default)]
    pub print_areas: Vec<PrintArea>,
    /// Default horizontal placement, relative to the print area
    #[serde(default)]
    pub x: Option<f64>,
    /// Default vertical placement, relative to the print area
    #[serde(default)]
    pub y: Option<f64>,
    /// Default image scale
    #[serde(default)]
    pub scale: Option<f64>,
    /// Value of the `Authorization` header sent to the fulfillment API
    pub token: String,
}

/// Variant pricing of a new product
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Pricing {
    /// One price, in cents, applied to every catalog variant
    Uniform(u64),
    /// Variant objects forwarded as-is
    PerVariant(Vec<Value>),
}

/// One entry of `printAreas`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PrintArea {
    /// A bare position name using the product level geometry
    Position(String),
    /// A position with its own geometry
    Placed {
        /// Position name
        position: String,
        /// Horizontal placement override
        #[serde(default)]
        x: Option<f64>,
        /// Vertical placement override
        #[serde(default)]
        y: Option<f64>,
        /// Scale override
        #[serde(default)]
        scale: Option<f64>,
    },
}

impl PrintArea {
    /// Position name of this area
    pub fn position(&self) -> &str {
        match self {
            Self::Position(position) | Self::Placed { position, .. } => position,
        }
    }
}

/// Catalog variants of a blueprint/provider pair
#[derive(Debug, Clone, Deserialize)]
pub struct VariantCatalog {
    /// Every variant offered
    pub variants: Vec<CatalogVariant>,
}

/// A catalog variant; only the id is used
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogVariant {
    /// Variant id
    pub id: u64,
}

/// Response of the image upload endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    /// Fulfillment-side image id
    pub id: String,
}

/// Fields relayed back to the caller after product creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreated {
    /// Mockup images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    /// Product variants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Value>,
    /// Product id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// Body of the product creation call
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    /// Product title
    pub title: String,
    /// Product description
    pub description: String,
    /// Catalog blueprint
    pub blueprint_id: u64,
    /// Print provider
    pub print_provider_id: u64,
    /// Priced variants
    pub variants: Vec<Value>,
    /// Print areas with their placeholders
    pub print_areas: Vec<PrintAreaPayload>,
}

/// One print area of [`NewProduct`]
#[derive(Debug, Clone, Serialize)]
pub struct PrintAreaPayload {
    /// Variants this area applies to
    pub variant_ids: Vec<u64>,
    /// Images per position
    pub placeholders: Vec<Placeholder>,
}

/// Images placed at one position
#[derive(Debug, Clone, Serialize)]
pub struct Placeholder {
    /// Position name
    pub position: String,
    /// Images placed there
    pub images: Vec<PlacedImage>,
}

/// An image within a placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedImage {
    /// Fulfillment-side image id
    pub id: String,
    /// Horizontal placement
    pub x: f64,
    /// Vertical placement
    pub y: f64,
    /// Scale
    pub scale: f64,
    /// Rotation in degrees
    pub angle: i32,
}

impl ProductSpec {
    /// Reshape into the fulfillment API's product body
    ///
    /// The front position gets `uploaded_image_id`; every other position gets
    /// `placeholder_image_id`.
    pub fn to_new_product(
        &self,
        catalog: &VariantCatalog,
        uploaded_image_id: &str,
        placeholder_image_id: &str,
    ) -> NewProduct {
        let variant_ids: Vec<u64> = catalog.variants.iter().map(|v| v.id).collect();

        let variants = match &self.price {
            Pricing::Uniform(price) => variant_ids
                .iter()
                .map(|id| serde_json::json!({ "id": id, "price": price }))
                .collect(),
            Pricing::PerVariant(variants) => variants.clone(),
        };

        let placeholders = self
            .print_areas
            .iter()
            .map(|area| {
                let (x, y, scale) = self.geometry(area);
                let id = if area.position() == FRONT_POSITION {
                    uploaded_image_id
                } else {
                    placeholder_image_id
                };
                Placeholder {
                    position: area.position().to_string(),
                    images: vec![PlacedImage {
                        id: id.to_string(),
                        x,
                        y,
                        scale,
                        angle: 0,
                    }],
                }
            })
            .collect();

        NewProduct {
            title: self.product_name.clone(),
            description: self.product_name.clone(),
            blueprint_id: self.blueprint_id,
            print_provider_id: self.provider_id,
            variants,
            print_areas: vec![PrintAreaPayload {
                variant_ids,
                placeholders,
            }],
        }
    }

    fn geometry(&self, area: &PrintArea) -> (f64, f64, f64) {
        let x = self.x.unwrap_or(DEFAULT_X);
        let y = self.y.unwrap_or(DEFAULT_Y);
        let scale = self.scale.unwrap_or(DEFAULT_SCALE);
        match area {
            PrintArea::Position(_) => (x, y, scale),
            PrintArea::Placed {
                x: ax,
                y: ay,
                scale: ascale,
                ..
            } => (ax.unwrap_or(x), ay.unwrap_or(y), ascale.unwrap_or(scale)),
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(u64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(id) => Ok(id),
        NumOrStr::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
