use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeslaModel {
    #[serde(rename = "Model 3")]
    Model3,
    #[serde(rename = "Model Y")]
    ModelY,
    #[serde(rename = "Model S")]
    ModelS,
    #[serde(rename = "Model X")]
    ModelX,
    Cybertruck,
}

impl TeslaModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeslaModel::Model3 => "Model 3",
            TeslaModel::ModelY => "Model Y",
            TeslaModel::ModelS => "Model S",
            TeslaModel::ModelX => "Model X",
            TeslaModel::Cybertruck => "Cybertruck",
        }
    }
}

impl fmt::Display for TeslaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeslaModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Model 3" => Ok(TeslaModel::Model3),
            "Model Y" => Ok(TeslaModel::ModelY),
            "Model S" => Ok(TeslaModel::ModelS),
            "Model X" => Ok(TeslaModel::ModelX),
            "Cybertruck" => Ok(TeslaModel::Cybertruck),
            other => Err(format!("unknown model: {}", other)),
        }
    }
}

/// Model selection of the filter bar: either every model or exactly one.
///
/// Serialized as `"All"` or the model's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ModelFilter {
    #[default]
    All,
    Only(TeslaModel),
}

impl ModelFilter {
    pub fn admits(&self, model: TeslaModel) -> bool {
        match self {
            ModelFilter::All => true,
            ModelFilter::Only(selected) => *selected == model,
        }
    }
}

impl From<ModelFilter> for String {
    fn from(filter: ModelFilter) -> Self {
        match filter {
            ModelFilter::All => "All".to_string(),
            ModelFilter::Only(model) => model.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for ModelFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(ModelFilter::All);
        }
        value.parse().map(ModelFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceFilter {
    #[default]
    All,
    Free,
    Paid,
}

impl PriceFilter {
    pub fn admits(&self, is_free: bool) -> bool {
        match self {
            PriceFilter::All => true,
            PriceFilter::Free => is_free,
            PriceFilter::Paid => !is_free,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    Newest,
    #[default]
    Popular,
    Downloads,
    NameAsc,
    NameDesc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub model: TeslaModel,
    pub category: String,
    pub style: String,
    pub creator: Creator,
    pub download_count: u32,
    pub likes: u32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub price: Option<f64>,
    pub is_free: bool,
    pub file_size: String,
    pub file_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub count: u32,
}

/// A category together with the skins currently shown under it.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    pub featured_skins: Vec<Skin>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub selected_model: ModelFilter,
    pub search_query: String,
    pub selected_categories: Vec<String>,
    pub selected_price: PriceFilter,
}

impl FilterState {
    /// Merges the fields present in `update`, leaving the others untouched.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(model) = update.selected_model {
            self.selected_model = model;
        }
        if let Some(query) = update.search_query {
            self.search_query = query;
        }
        if let Some(categories) = update.selected_categories {
            self.selected_categories = categories;
        }
        if let Some(price) = update.selected_price {
            self.selected_price = price;
        }
    }

    pub fn is_active(&self) -> bool {
        *self != FilterState::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterUpdate {
    pub selected_model: Option<ModelFilter>,
    pub search_query: Option<String>,
    pub selected_categories: Option<Vec<String>>,
    pub selected_price: Option<PriceFilter>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SkinQuery {
    pub model: Option<ModelFilter>,
    pub q: Option<String>,
    /// Comma separated category ids.
    pub categories: Option<String>,
    pub price: Option<PriceFilter>,
    pub sort: Option<SortOption>,
}

impl SkinQuery {
    pub fn to_filters(&self) -> FilterState {
        FilterState {
            selected_model: self.model.unwrap_or_default(),
            search_query: self.q.clone().unwrap_or_default(),
            selected_categories: self
                .categories
                .as_deref()
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            selected_price: self.price.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CategoryPageQuery {
    pub price: Option<PriceFilter>,
    pub model: Option<ModelFilter>,
    pub sort: Option<SortOption>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub skins: Vec<Skin>,
    pub total_in_category: usize,
    pub free_count: usize,
    pub paid_count: usize,
    pub total_downloads: u64,
    pub models: Vec<TeslaModel>,
}

#[derive(Debug, Serialize)]
pub struct SkinDetail {
    pub skin: Skin,
    pub related: Vec<Skin>,
}
