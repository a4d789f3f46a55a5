use std::collections::HashMap;
use std::rc::Rc;

/// The caller-facing 4-tuple produced by the build step:
/// `(module id, css, media query, optional source map)`.
pub type StyleTuple = (i32, String, String, Option<serde_json::Value>);

/// One CSS fragment plus its media query and optional source map; the
/// smallest independently-updatable unit. Replaced wholesale on update,
/// never mutated field-by-field.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub css: String,
    pub media: String,
    pub source_map: Option<serde_json::Value>,
}

/// All parts sharing one module id, in input order. Built fresh from each
/// input list; registry identity is the `Rc` allocation, not the id value.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleModule {
    pub id: i32,
    pub parts: Vec<Part>,
}

/// Groups an input list into module descriptors: first-seen id determines
/// descriptor position, and tuples repeating an id append to that module's
/// parts in input order.
pub fn list_to_modules(list: Vec<StyleTuple>) -> Vec<Rc<StyleModule>> {
    let mut modules: Vec<StyleModule> = Vec::new();
    let mut index_by_id: HashMap<i32, usize> = HashMap::new();

    for (id, css, media, source_map) in list {
        let part = Part {
            css,
            media,
            source_map,
        };
        match index_by_id.get(&id) {
            Some(&index) => modules[index].parts.push(part),
            None => {
                index_by_id.insert(id, modules.len());
                modules.push(StyleModule {
                    id,
                    parts: vec![part],
                });
            }
        }
    }

    modules.into_iter().map(Rc::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(id: i32, css: &str) -> StyleTuple {
        (id, css.to_string(), String::new(), None)
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let modules = list_to_modules(vec![tuple(3, "c"), tuple(1, "a"), tuple(2, "b")]);
        let ids: Vec<i32> = modules.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_repeated_id_merges_parts_in_input_order() {
        let modules = list_to_modules(vec![
            tuple(1, "first"),
            tuple(2, "other"),
            tuple(1, "second"),
        ]);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].id, 1);
        let css: Vec<&str> = modules[0].parts.iter().map(|p| p.css.as_str()).collect();
        assert_eq!(css, vec!["first", "second"]);
    }

    #[test]
    fn test_parts_carry_media_and_source_map() {
        let map = serde_json::json!({ "version": 3, "sources": ["a.css"] });
        let modules = list_to_modules(vec![(
            7,
            "a{}".to_string(),
            "screen".to_string(),
            Some(map.clone()),
        )]);
        assert_eq!(modules[0].parts[0].media, "screen");
        assert_eq!(modules[0].parts[0].source_map.as_ref(), Some(&map));
    }

    #[test]
    fn test_empty_list_yields_no_modules() {
        assert!(list_to_modules(Vec::new()).is_empty());
    }
}
