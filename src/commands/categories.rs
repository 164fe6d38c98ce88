use crate::commands::Out;
use crate::model::Category;
use crate::Result;

/// Handles `gofinances categories`: lists the category keys accepted by `register`.
pub async fn categories() -> Result<Out<Vec<Category>>> {
    let all = Category::all();
    let lines: Vec<String> = all
        .iter()
        .map(|c| format!("  {:<10} {}", c.key(), c.name()))
        .collect();
    Ok(Out::new(
        format!("Categories:\n{}", lines.join("\n")),
        all.to_vec(),
    ))
}

#[tokio::test]
async fn test_categories() {
    let out = categories().await.unwrap();
    assert_eq!(out.structure().unwrap().len(), 6);
    assert!(out.message().contains("food       Alimentação"));
}
