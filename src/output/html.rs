//! HTML Markup Tree
//!
//! マークアップを文字列連結ではなく要素ツリーとして構築し、
//! 1回のシリアライズでエスケープを一律に適用するモジュール。
//! データ由来の文字列は必ず`Node::Text`または属性値として渡され、
//! `<` `>` `&` `"` がエスケープされます。

use std::borrow::Cow;

use html_escape::encode_double_quoted_attribute;

/// 終了タグを持たない要素
const VOID_TAGS: &[&str] = &["meta", "link", "br", "hr", "img"];

/// 行内に収めて出力する要素
const INLINE_TAGS: &[&str] = &["strong", "em", "span"];

/// ツリーのノード
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    /// 子要素と属性を持つ要素
    Element(Element),

    /// エスケープして出力するテキスト
    Text(String),

    /// そのまま出力する静的なマークアップ（スタイルシートなど）
    Raw(Cow<'static, str>),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// HTML要素
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    /// 新しい要素を生成
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 属性を追加
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// `class`属性を追加
    pub fn class(self, class: &'static str) -> Self {
        self.attr("class", class)
    }

    /// 子ノードを追加
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// 複数の子要素を追加
    pub fn children(mut self, nodes: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(nodes.into_iter().map(Node::Element));
        self
    }

    /// テキストノードを追加
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    /// 静的なマークアップを追加
    pub fn raw(self, markup: &'static str) -> Self {
        self.child(Node::Raw(Cow::Borrowed(markup)))
    }

    fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag)
    }

    /// 子がすべてテキストか行内要素であれば、1行で出力できる
    fn is_inline(&self) -> bool {
        self.children.iter().all(|child| match child {
            Node::Text(_) => true,
            Node::Element(e) => INLINE_TAGS.contains(&e.tag) && e.is_inline(),
            Node::Raw(_) => false,
        })
    }
}

/// 文書全体をシリアライズ
///
/// 出力は入力ツリーだけで決まり、同じツリーからは常に同じ文字列が得られます。
pub(crate) fn render_document(root: &Element) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str("<!DOCTYPE html>\n");
    write_block(&mut out, root, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

fn write_open_tag(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
}

fn write_close_tag(out: &mut String, element: &Element) {
    out.push_str("</");
    out.push_str(element.tag);
    out.push('>');
}

/// 要素を1行で出力（内部ヘルパー）
fn write_inline(out: &mut String, element: &Element) {
    write_open_tag(out, element);
    if element.is_void() {
        return;
    }
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(&encode_double_quoted_attribute(text)),
            Node::Element(e) => write_inline(out, e),
            Node::Raw(markup) => out.push_str(markup),
        }
    }
    write_close_tag(out, element);
}

/// 要素をインデント付きのブロックとして出力（内部ヘルパー）
fn write_block(out: &mut String, element: &Element, depth: usize) {
    indent(out, depth);

    if element.is_void() || element.is_inline() {
        write_inline(out, element);
        out.push('\n');
        return;
    }

    write_open_tag(out, element);
    out.push('\n');

    for child in &element.children {
        match child {
            Node::Element(e) => write_block(out, e, depth + 1),
            Node::Text(text) => {
                indent(out, depth + 1);
                out.push_str(&encode_double_quoted_attribute(text));
                out.push('\n');
            }
            Node::Raw(markup) => {
                out.push_str(markup.trim_matches('\n'));
                out.push('\n');
            }
        }
    }

    indent(out, depth);
    write_close_tag(out, element);
    out.push('\n');
}
