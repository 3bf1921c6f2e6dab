use super::*;
use serde_json::json;

#[test]
fn test_deserialize_full_recipe() {
    let value = json!({
        "id_legacy": "cal-smart-tex-mex-beef-bowls",
        "title": "Tex-Mex Beef Bowls",
        "description": "Spicy beef over rice",
        "cuisine": "Mexican",
        "tags": ["high-protein", "dinner"],
        "servings": 4,
        "ingredients": [
            {"name": "ground beef", "quantity": 1, "unit": "lb"},
            {"name": "rice", "quantity": "1 1/2", "unit": "cups"},
            "salt"
        ],
        "images": ["beef-bowl.jpg"],
        "calories": 540
    });

    let recipe: Recipe = serde_json::from_value(value).unwrap();

    assert_eq!(recipe.id_legacy, "cal-smart-tex-mex-beef-bowls");
    assert_eq!(recipe.cuisine.as_deref(), Some("Mexican"));
    assert_eq!(recipe.servings, Some(4));
    assert_eq!(recipe.ingredients.len(), 3);
    assert_eq!(recipe.ingredients[0], Ingredient::new("ground beef", Some(1.0), Some("lb")));
    assert_eq!(recipe.ingredients[1].quantity, Some(1.5));
    assert_eq!(recipe.ingredients[2], Ingredient::new("salt", None, None));
    assert_eq!(recipe.extra.get("calories"), Some(&json!(540)));
}

#[test]
fn test_legacy_cousine_key_is_read_as_cuisine() {
    let recipe: Recipe = serde_json::from_value(json!({
        "id_legacy": "r1",
        "title": "Pad Thai",
        "cousine": "Thai"
    }))
    .unwrap();

    assert_eq!(recipe.cuisine.as_deref(), Some("Thai"));
    assert!(recipe.extra.is_empty());
}

#[test]
fn test_missing_optional_fields_default() {
    let recipe: Recipe = serde_json::from_value(json!({"id_legacy": "r1", "title": "Toast"})).unwrap();

    assert_eq!(recipe, Recipe::new("r1", "Toast"));
}

#[test]
fn test_missing_id_is_rejected() {
    let result = serde_json::from_value::<Recipe>(json!({"title": "No id"}));
    assert!(result.is_err());
}

#[test]
fn test_extra_attributes_survive_serialization() {
    let value = json!({
        "id_legacy": "r1",
        "title": "Soup",
        "tags": [],
        "ingredients": [],
        "images": [],
        "prep_minutes": 15,
        "nutrition": {"kcal": 200}
    });

    let recipe: Recipe = serde_json::from_value(value.clone()).unwrap();
    let back = serde_json::to_value(&recipe).unwrap();

    assert_eq!(back, value);
}

#[test]
fn test_embedding_text() {
    let mut recipe = Recipe::new("r1", "Chicken Tacos");
    assert_eq!(recipe.embedding_text(), "Chicken Tacos ");

    recipe.description = Some("Quick weeknight tacos".to_string());
    assert_eq!(recipe.embedding_text(), "Chicken Tacos Quick weeknight tacos");
}

#[test]
fn test_has_all_tags_is_case_insensitive() {
    let mut recipe = Recipe::new("r1", "Salad");
    recipe.tags = vec!["Vegetarian".to_string(), "low-carb".to_string()];

    assert!(recipe.has_all_tags(&[]));
    assert!(recipe.has_all_tags(&["vegetarian".to_string()]));
    assert!(recipe.has_all_tags(&["LOW-CARB".to_string(), " vegetarian ".to_string()]));
    assert!(!recipe.has_all_tags(&["vegan".to_string()]));
}

#[test]
fn test_search_tokens_cover_all_text_fields() {
    let mut recipe = Recipe::new("r1", "Green Curry");
    recipe.description = Some("Coconut-based, mild".to_string());
    recipe.cuisine = Some("Thai".to_string());
    recipe.tags = vec!["gluten-free".to_string()];

    let tokens = recipe.search_tokens();
    for word in ["green", "curry", "coconut", "based", "mild", "thai", "gluten", "free"] {
        assert!(tokens.contains(word), "missing token {}", word);
    }
}

#[test]
fn test_parse_quantity() {
    assert_eq!(parse_quantity("2"), Some(2.0));
    assert_eq!(parse_quantity("0.25"), Some(0.25));
    assert_eq!(parse_quantity("3/4"), Some(0.75));
    assert_eq!(parse_quantity("1 1/2"), Some(1.5));
    assert_eq!(parse_quantity("to taste"), None);
    assert_eq!(parse_quantity("1/0"), None);
    assert_eq!(parse_quantity(""), None);
}

#[test]
fn test_recipe_view_flattens_recipe() {
    let view = RecipeView {
        recipe: Recipe::new("r1", "Soup"),
        image_urls: vec!["/images/soup.jpg".to_string()],
        recommended_recipes: None,
    };

    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["id_legacy"], "r1");
    assert_eq!(value["image_urls"], json!(["/images/soup.jpg"]));
    assert!(value.get("recommended_recipes").is_none());

    let back: RecipeView = serde_json::from_value(value).unwrap();
    assert_eq!(back.recipe, view.recipe);
    assert_eq!(back.image_urls, view.image_urls);
}
