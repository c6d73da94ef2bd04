//! `ipm hints` as a terminal filter

use crate::common::TestWorkspace;
use crate::ipm;
use anyhow::Result;

#[test]
fn test_npe_trace_gets_hint() -> Result<()> {
    let ws = TestWorkspace::new()?;

    let result = ipm!(ws.path(), "hints")
        .stdin("Exception in thread \"main\" java.lang.NullPointerException\n\tat Foo.main(Foo.java:10)\n")
        .assert_success()?;

    assert!(result.contains_stdout("Exception in thread \"main\" java.lang.NullPointerException"));
    assert!(result.contains_stdout("\tat Foo.main(Foo.java:10)"));
    assert!(result.contains_stdout("【参考】教科書270ページ"));
    assert!(result.contains_stdout(&"^".repeat("java.lang.NullPointerException".len())));
    Ok(())
}

#[test]
fn test_plain_output_is_echoed_unchanged() -> Result<()> {
    let ws = TestWorkspace::new()?;

    let result = ipm!(ws.path(), "hints")
        .stdin("Hello, World!\nno known exception here\n")
        .assert_success()?;

    assert_eq!(result.stdout, "Hello, World!\nno known exception here\n");
    Ok(())
}

#[test]
fn test_configured_rule_is_used() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write(
        ".ipmanten.toml",
        r#"
[[hints.rules]]
match_text = "java.util.InputMismatchException"
message = "入力された値の型を確認しましょう"
"#,
    )?;

    let result = ipm!(ws.path(), "hints")
        .stdin("Exception in thread \"main\" java.util.InputMismatchException\n")
        .assert_success()?;

    assert!(result.contains_stdout("入力された値の型を確認しましょう"));
    Ok(())
}
