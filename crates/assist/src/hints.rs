//! Exception hints for terminal output
//!
//! Each rule is checked independently against a line: the first occurrence of
//! its text yields one hint spanning exactly that text. Several rules may hit
//! the same line.

use std::borrow::Cow;

/// Built-in rules, in match order
const BUILTIN_RULES: &[(&str, &str)] = &[
    (
        "java.lang.NullPointerException",
        "値がnullである変数を操作してしまったようです。以下に表示されている行番号付近で、値がnullになるケースがないかよく調べてみましょう。【参考】教科書270ページ",
    ),
    (
        "java.lang.ArrayIndexOutOfBoundsException",
        "範囲外の配列インデックスを操作してしまったようです。以下に表示されている行番号付近で、要素数nの配列のインデックスが0からn-1までであることを踏まえて、範囲外のインデックスを操作していないかよく調べてみましょう。【参考】教科書173ページ",
    ),
    (
        "java.lang.ArithmeticException",
        "ゼロでの除算をしてしまったようです。以下に表示されている行番号付近を調べて、値を0で割る（分母が0である）ケースがないかよく調べてみましょう。【参考】教科書425ページ",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintRule {
    pub match_text: Cow<'static, str>,
    pub message: Cow<'static, str>,
}

impl HintRule {
    pub fn new(match_text: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            match_text: match_text.into(),
            message: message.into(),
        }
    }
}

/// A matched span within one line
///
/// `offset` and `length` are byte offsets into the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint<'a> {
    pub offset: usize,
    pub length: usize,
    pub message: &'a str,
}

impl Hint<'_> {
    /// Surface the message once; nothing is retained
    pub fn activate(&self, notifier: &dyn Notifier) {
        notifier.notify(self.message);
    }
}

/// Displays a message to the user
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Immutable rule table, fixed once built
#[derive(Debug, Clone)]
pub struct HintTable {
    rules: Vec<HintRule>,
}

impl Default for HintTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HintTable {
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES
                .iter()
                .map(|&(text, message)| HintRule::new(text, message))
                .collect(),
        }
    }

    /// Built-in rules followed by `extra`; rules with empty text are dropped
    pub fn with_rules(extra: impl IntoIterator<Item = HintRule>) -> Self {
        let mut table = Self::builtin();
        table
            .rules
            .extend(extra.into_iter().filter(|rule| !rule.match_text.is_empty()));
        table
    }

    pub fn rules(&self) -> &[HintRule] {
        &self.rules
    }

    pub fn match_line<'a>(&'a self, line: &str) -> Vec<Hint<'a>> {
        self.rules
            .iter()
            .filter_map(|rule| {
                line.find(rule.match_text.as_ref()).map(|offset| Hint {
                    offset,
                    length: rule.match_text.len(),
                    message: rule.message.as_ref(),
                })
            })
            .collect()
    }
}
