mod common;

use common::{preloaded, Reply, ScriptedPrompter};
use indexmap::IndexMap;
use kiln::answers::Answer;
use kiln::engine::{AskMode, QuestionEngine};
use kiln::error::Error;
use kiln::question::Question;
use kiln::renderer::MiniJinjaRenderer;
use kiln::validators;

fn name_and_confirm_delete() -> Vec<Question> {
    vec![
        Question::text("name", "Name").validate(validators::not_blank("Name is required")),
        Question::confirm("confirmDelete", "Delete {{ name }}?")
            .default(true)
            .ask_if(|answers| answers.str("name").is_some_and(|name| !name.is_empty())),
    ]
}

#[test]
fn test_one_answer_per_question_in_order() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::new(vec![
        Reply::Text("Invoice"),
        Reply::Confirm(true),
        Reply::Select(1),
        Reply::MultiSelect(vec![0, 2]),
    ]);
    let engine = QuestionEngine::new(&prompter, &renderer, AskMode::Interactive, IndexMap::new());

    let questions = vec![
        Question::text("name", "Name"),
        Question::confirm("audit", "Audit?"),
        Question::select("kind", "Kind", ["a", "b", "c"]),
        Question::multi_select("tags", "Tags", ["x", "y", "z"]),
    ];
    let answers = engine.ask(&questions).unwrap();

    assert_eq!(answers.keys().collect::<Vec<_>>(), vec!["name", "audit", "kind", "tags"]);
    assert_eq!(answers.get("kind"), Some(&Answer::Choice("b".to_string())));
    assert_eq!(
        answers.get("tags"),
        Some(&Answer::List(vec!["x".to_string(), "z".to_string()]))
    );
}

#[test]
fn test_name_and_confirm_delete_scenario() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::new(vec![Reply::Default]);
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::Interactive,
        preloaded(&[("name", "Invoice")]),
    );

    let answers = engine.ask(&name_and_confirm_delete()).unwrap();

    assert_eq!(answers.len(), 2);
    assert_eq!(answers.text("name").unwrap(), "Invoice");
    assert!(answers.flag("confirmDelete").unwrap());
    // Prompts are rendered against earlier answers.
    assert_eq!(*prompter.prompts.borrow(), vec!["Delete Invoice?".to_string()]);
}

#[test]
fn test_name_and_confirm_delete_non_interactive() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::NonInteractive,
        preloaded(&[("name", "Invoice")]),
    );

    let answers = engine.ask(&name_and_confirm_delete()).unwrap();

    assert_eq!(answers.to_json(), serde_json::json!({"name": "Invoice", "confirmDelete": true}));
    assert!(prompter.prompts.borrow().is_empty());
}

#[test]
fn test_skipped_question_is_absent() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::new(vec![Reply::Confirm(false), Reply::Default]);
    let engine = QuestionEngine::new(&prompter, &renderer, AskMode::Interactive, IndexMap::new());

    let questions = vec![
        Question::confirm("addToMenu", "Add to menu?"),
        Question::text("caption", "Caption").ask_if(|answers| answers.flag("addToMenu").unwrap_or(false)),
        Question::text("summary", "Summary").default_with(|answers| {
            Some(Answer::Text(answers.str("caption").unwrap_or("none").to_string()))
        }),
    ];
    let answers = engine.ask(&questions).unwrap();

    assert!(!answers.contains("caption"));
    assert_eq!(answers.text("summary").unwrap(), "none");
}

#[test]
fn test_interactive_reprompts_after_validation_failure() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::new(vec![Reply::Text("invoice"), Reply::Text("Invoice")]);
    let engine = QuestionEngine::new(&prompter, &renderer, AskMode::Interactive, IndexMap::new());

    let answers = engine
        .ask(&[Question::text("entityName", "Entity name").validate(validators::is_class())])
        .unwrap();

    assert_eq!(answers.text("entityName").unwrap(), "Invoice");
    assert_eq!(*prompter.errors.borrow(), vec!["Invalid class name".to_string()]);
}

#[test]
fn test_validators_stop_at_first_failure() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::NonInteractive,
        preloaded(&[("name", "")]),
    );

    let question = Question::text("name", "Name")
        .validate(validators::not_blank("first"))
        .validate(validators::not_blank("second"));

    match engine.ask(&[question]) {
        Err(Error::ValidationError { key, message }) => {
            assert_eq!(key, "name");
            assert_eq!(message, "first");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_non_interactive_missing_value_fails() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(&prompter, &renderer, AskMode::NonInteractive, IndexMap::new());

    let result = engine.ask(&[Question::text("platformVersion", "Platform version")]);
    assert!(matches!(result, Err(Error::ValidationError { key, .. }) if key == "platformVersion"));
}

#[test]
fn test_preloaded_values_are_converted() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::NonInteractive,
        preloaded(&[("audit", "Yes"), ("kind", "c"), ("index", "b"), ("tags", "x, z")]),
    );

    let answers = engine
        .ask(&[
            Question::confirm("audit", "Audit?"),
            Question::select("kind", "Kind", ["a", "b", "c"]),
            Question::select("index", "Index", ["a", "b", "c"]).store_index(),
            Question::multi_select("tags", "Tags", ["x", "y", "z"]),
        ])
        .unwrap();

    assert!(answers.flag("audit").unwrap());
    assert_eq!(answers.text("kind").unwrap(), "c");
    assert_eq!(answers.index("index").unwrap(), 1);
    assert_eq!(answers.list("tags").unwrap(), ["x".to_string(), "z".to_string()]);
}

#[test]
fn test_preloaded_unknown_option_fails() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::Interactive,
        preloaded(&[("database", "sqlite")]),
    );

    let result = engine.ask(&[Question::select("database", "Database", ["hsql", "postgres"])]);
    assert!(matches!(result, Err(Error::ValidationError { key, .. }) if key == "database"));
    assert!(prompter.prompts.borrow().is_empty());
}

#[test]
fn test_template_default() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::NonInteractive,
        preloaded(&[("namespace", "Sales")]),
    );

    let answers = engine
        .ask(&[
            Question::text("namespace", "Namespace"),
            Question::text("rootPackage", "Root package")
                .default_template("com.company.{{ namespace | lower }}"),
        ])
        .unwrap();

    assert_eq!(answers.text("rootPackage").unwrap(), "com.company.sales");
}

#[test]
fn test_broken_template_default_fails() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::NonInteractive,
        preloaded(&[("namespace", "sales")]),
    );

    let result = engine.ask(&[
        Question::text("namespace", "Namespace"),
        Question::text("rootPackage", "Root package").default_template("com.{{ namespace"),
    ]);

    assert!(matches!(result, Err(Error::MinijinjaError(_))));
}

#[test]
fn test_broken_prompt_fails_before_asking() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::new(vec![Reply::Text("Invoice")]);
    let engine = QuestionEngine::new(&prompter, &renderer, AskMode::Interactive, IndexMap::new());

    let result = engine.ask(&[Question::text("name", "Name of {% if %}")]);

    assert!(matches!(result, Err(Error::MinijinjaError(_))));
    assert_eq!(prompter.remaining(), 1);
}

#[test]
fn test_duplicate_keys_are_rejected_before_asking() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::new(vec![Reply::Text("a")]);
    let engine = QuestionEngine::new(&prompter, &renderer, AskMode::Interactive, IndexMap::new());

    let result = engine.ask(&[Question::text("name", "Name"), Question::text("name", "Again")]);

    assert!(matches!(result, Err(Error::ConfigError(_))));
    assert_eq!(prompter.remaining(), 1);
}

fn listener_group() -> Question {
    Question::group(
        "interfaces",
        vec![
            Question::confirm("beforeInsert", "Before insert?").default(true),
            Question::confirm("afterInsert", "After insert?").default(true),
        ],
    )
    .validate_group(|answers| {
        if answers.flag("beforeInsert").unwrap_or(false) || answers.flag("afterInsert").unwrap_or(false) {
            Ok(())
        } else {
            Err("Listener must implement at least one of the interfaces".to_string())
        }
    })
}

#[test]
fn test_group_validator_reasks_group() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::new(vec![
        Reply::Confirm(false),
        Reply::Confirm(false),
        Reply::Confirm(false),
        Reply::Confirm(true),
    ]);
    let engine = QuestionEngine::new(&prompter, &renderer, AskMode::Interactive, IndexMap::new());

    let answers = engine.ask(&[listener_group()]).unwrap();

    assert_eq!(answers.keys().collect::<Vec<_>>(), vec!["beforeInsert", "afterInsert"]);
    assert!(!answers.flag("beforeInsert").unwrap());
    assert!(answers.flag("afterInsert").unwrap());
    assert_eq!(prompter.errors.borrow().len(), 1);
}

#[test]
fn test_group_validator_fails_non_interactive() {
    let renderer = MiniJinjaRenderer::new();
    let prompter = ScriptedPrompter::default();
    let engine = QuestionEngine::new(
        &prompter,
        &renderer,
        AskMode::NonInteractive,
        preloaded(&[("beforeInsert", "no"), ("afterInsert", "no")]),
    );

    let result = engine.ask(&[listener_group()]);
    assert!(matches!(result, Err(Error::ValidationError { key, .. }) if key == "interfaces"));
}
