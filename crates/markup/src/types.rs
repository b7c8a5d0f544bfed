/// Parsing mode. `Html` enables the void-element table and rawtext handling
/// for `script`/`style`; `Xml` treats every element uniformly and closes
/// elements early only on `/>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupMode {
    Html,
    Xml,
}

#[derive(Debug, PartialEq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
}
