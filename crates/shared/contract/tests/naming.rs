use polycase_contract::NamingConvention;
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Z][a-z]{1,6}", 1..5)
}

proptest! {
    #[test]
    fn pascal_case_keeps_declared_names(words in identifier()) {
        let name = words.concat();
        prop_assert_eq!(NamingConvention::PascalCase.apply(&name), name);
    }

    #[test]
    fn camel_case_only_lowers_the_first_letter(words in identifier()) {
        let name = words.concat();
        let camel = NamingConvention::CamelCase.apply(&name);

        prop_assert_eq!(camel.len(), name.len());
        prop_assert_eq!(&camel[1..], &name[1..]);
        prop_assert!(camel.starts_with(|c: char| c.is_ascii_lowercase()));
    }

    #[test]
    fn snake_case_joins_lowered_words(words in identifier()) {
        let name = words.concat();
        let expected = words.iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_");
        prop_assert_eq!(NamingConvention::SnakeCase.apply(&name), expected);
    }

    #[test]
    fn kebab_case_mirrors_snake_case(words in identifier()) {
        let name = words.concat();
        let snake = NamingConvention::SnakeCase.apply(&name);
        prop_assert_eq!(NamingConvention::KebabCase.apply(&name), snake.replace('_', "-"));
    }

    #[test]
    fn unknown_labels_never_parse(label in "[a-z]{3,12}") {
        let known = ["camelcase", "snake_case", "kebab-case", "pascalcase"];
        prop_assume!(!known.contains(&label.as_str()));
        prop_assert!(NamingConvention::from_label(&label).is_none());
    }
}
