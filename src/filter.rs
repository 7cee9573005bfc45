//! Pure derivations over the catalog. Nothing in here owns state: every
//! function takes the product list and the criteria and returns a fresh view.

use crate::models::{
    Category, CategoryPage, CategoryView, FilterState, ModelFilter, PriceFilter, Skin, SortOption,
    TeslaModel,
};
use std::cmp::Ordering;

/// Case-insensitive substring match against name, description, creator,
/// tags and category. `query` must already be lowercased.
fn matches_query(skin: &Skin, query: &str) -> bool {
    skin.name.to_lowercase().contains(query)
        || skin.description.to_lowercase().contains(query)
        || skin.creator.name.to_lowercase().contains(query)
        || skin.tags.iter().any(|tag| tag.to_lowercase().contains(query))
        || skin.category.to_lowercase().contains(query)
}

pub fn matches(skin: &Skin, filters: &FilterState) -> bool {
    if !filters.selected_model.admits(skin.model) {
        return false;
    }

    // A whitespace-only query is inactive, but an active one is matched as typed.
    if !filters.search_query.trim().is_empty()
        && !matches_query(skin, &filters.search_query.to_lowercase())
    {
        return false;
    }

    if !filters.selected_categories.is_empty()
        && !filters.selected_categories.iter().any(|c| *c == skin.category)
    {
        return false;
    }

    filters.selected_price.admits(skin.is_free)
}

pub fn filter_skins(skins: &[Skin], filters: &FilterState) -> Vec<Skin> {
    let mut filtered = skins.to_vec();
    filtered.retain(|skin| matches(skin, filters));
    filtered
}

/// Groups `filtered` by category, keeping at most `cap` skins per category.
/// Every category is returned, empty ones included, in catalog order.
pub fn categorize(categories: &[Category], filtered: &[Skin], cap: usize) -> Vec<CategoryView> {
    categories
        .iter()
        .map(|category| CategoryView {
            category: category.clone(),
            featured_skins: filtered
                .iter()
                .filter(|skin| skin.category == category.id)
                .take(cap)
                .cloned()
                .collect(),
        })
        .collect()
}

fn compare_names(a: &Skin, b: &Skin) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_skins(skins: &mut [Skin], sort: SortOption) {
    skins.sort_by(|a, b| match sort {
        SortOption::Newest => b.created_at.cmp(&a.created_at),
        SortOption::Popular => b.likes.cmp(&a.likes),
        SortOption::Downloads => b.download_count.cmp(&a.download_count),
        SortOption::NameAsc => compare_names(a, b),
        SortOption::NameDesc => compare_names(a, b).reverse(),
    });
}

pub fn filter_and_sort(skins: &[Skin], filters: &FilterState, sort: Option<SortOption>) -> Vec<Skin> {
    let mut filtered = filter_skins(skins, filters);
    if let Some(sort) = sort {
        sort_skins(&mut filtered, sort);
    }
    filtered
}

/// Other skins sharing the category or the model of `skin`, in catalog order.
pub fn related_skins(skins: &[Skin], skin: &Skin, limit: usize) -> Vec<Skin> {
    skins
        .iter()
        .filter(|s| s.id != skin.id && (s.category == skin.category || s.model == skin.model))
        .take(limit)
        .cloned()
        .collect()
}

pub fn category_page(
    skins: &[Skin],
    category: &Category,
    price: PriceFilter,
    model: ModelFilter,
    sort: SortOption,
) -> CategoryPage {
    let in_category: Vec<&Skin> = skins.iter().filter(|s| s.category == category.id).collect();

    let mut models: Vec<TeslaModel> = Vec::new();
    for skin in &in_category {
        if !models.contains(&skin.model) {
            models.push(skin.model);
        }
    }

    let mut listed: Vec<Skin> = in_category
        .iter()
        .filter(|s| price.admits(s.is_free) && model.admits(s.model))
        .map(|s| (*s).clone())
        .collect();
    sort_skins(&mut listed, sort);

    CategoryPage {
        category: category.clone(),
        skins: listed,
        total_in_category: in_category.len(),
        free_count: in_category.iter().filter(|s| s.is_free).count(),
        paid_count: in_category.iter().filter(|s| !s.is_free).count(),
        total_downloads: in_category.iter().map(|s| u64::from(s.download_count)).sum(),
        models,
    }
}

pub fn find_skin<'a>(skins: &'a [Skin], id: &str) -> Option<&'a Skin> {
    skins.iter().find(|s| s.id == id)
}

pub fn find_category<'a>(categories: &'a [Category], id: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.id == id)
}
