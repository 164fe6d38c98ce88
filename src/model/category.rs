use serde::Serialize;

/// A spending or income category a transaction can be filed under.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Category {
    key: &'static str,
    name: &'static str,
}

impl Category {
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Looks up a category by its `key`.
    pub fn find(key: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.key == key)
    }

    /// All known categories, in display order.
    pub fn all() -> &'static [Category] {
        CATEGORIES
    }
}

const CATEGORIES: &[Category] = &[
    Category {
        key: "purchases",
        name: "Compras",
    },
    Category {
        key: "food",
        name: "Alimentação",
    },
    Category {
        key: "salary",
        name: "Salário",
    },
    Category {
        key: "car",
        name: "Carro",
    },
    Category {
        key: "leisure",
        name: "Lazer",
    },
    Category {
        key: "studies",
        name: "Estudos",
    },
];

#[test]
fn test_find_category() {
    assert_eq!(Category::find("food").unwrap().name(), "Alimentação");
    assert!(Category::find("category").is_none());
    assert_eq!(Category::all().len(), 6);
}
