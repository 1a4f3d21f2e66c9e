pub mod types;
pub mod utils;
pub mod pagination;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn page_serializes_with_totals() {
        let page = types::Page { items: vec![1, 2], page: 1, per_page: 2, total: 5 };
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["total"], 5);
        assert_eq!(v["items"].as_array().map(|a| a.len()), Some(2));
    }
}
