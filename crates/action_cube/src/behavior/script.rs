//! Tree script loader
//!
//! Формат (отступы пробелами, tab = 4 пробела, `#`: комментарий):
//!
//! ```text
//! tree Root
//!     fallback
//!         sequence
//!             EnemyClose
//!             GoEnemy
//!             Attack
//!         sequence
//!             Rest
//!             Patrol
//! ```
//!
//! Узлы: `fallback`/`selector`, `sequence`, `not`, `succeed` и имена тасков
//! из [`TaskRegistry`]. Заголовок `tree("Root")` тоже принимается.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{builder, Behavior, Status};

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script is empty")]
    Empty,

    #[error("line {line}: expected `tree <Name>` header, got `{found}`")]
    MissingTreeHeader { line: usize, found: String },

    #[error("tree `{name}` has no root node")]
    MissingRoot { name: String },

    #[error("line {line}: node must be indented under the tree header")]
    Unindented { line: usize },

    #[error("line {line}: indentation is not a multiple of {width} spaces")]
    IndentWidth { line: usize, width: usize },

    #[error("line {line}: indentation jumps more than one level")]
    IndentJump { line: usize },

    #[error("line {line}: unknown node `{name}`")]
    UnknownNode { line: usize, name: String },

    #[error("line {line}: `{kind}` needs at least one child")]
    EmptyComposite { line: usize, kind: String },

    #[error("line {line}: `{kind}` takes exactly one child, got {count}")]
    DecoratorArity { line: usize, kind: String, count: usize },

    #[error("line {line}: task `{name}` cannot have children")]
    TaskWithChildren { line: usize, name: String },

    #[error("line {line}: tree must have exactly one root node")]
    MultipleRoots { line: usize },
}

/// Фабрика листа дерева (один свежий экземпляр на каждое упоминание в скрипте)
pub type TaskFactory<C> = fn() -> Box<dyn Behavior<C>>;

/// Имена тасков, доступные скрипту
pub struct TaskRegistry<C> {
    tasks: BTreeMap<String, TaskFactory<C>>,
}

impl<C> Default for TaskRegistry<C> {
    fn default() -> Self {
        Self { tasks: BTreeMap::new() }
    }
}

impl<C: 'static> TaskRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, factory: TaskFactory<C>) -> &mut Self {
        self.tasks.insert(name.into(), factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    fn build(&self, name: &str) -> Option<Box<dyn Behavior<C>>> {
        self.tasks.get(name).map(|factory| factory())
    }
}

/// Именованное дерево, собранное из скрипта (или кодом)
pub struct BehaviorTree<C> {
    pub name: String,
    root: Box<dyn Behavior<C>>,
}

impl<C> BehaviorTree<C> {
    pub fn new(name: impl Into<String>, root: Box<dyn Behavior<C>>) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

impl<C> Behavior<C> for BehaviorTree<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        self.root.tick(ctx)
    }
}

/// Строка скрипта до сборки узлов
#[derive(Debug)]
struct RawNode {
    line: usize,
    name: String,
    children: Vec<RawNode>,
}

/// Парсит скрипт и собирает дерево.
pub fn parse_tree<C: 'static>(
    source: &str,
    registry: &TaskRegistry<C>,
) -> Result<BehaviorTree<C>, ScriptError> {
    let mut lines = significant_lines(source);

    let (header_line, header_indent, header) = lines.next().ok_or(ScriptError::Empty)?;
    let tree_name = match parse_header(header) {
        Some(name) if header_indent == 0 => name,
        _ => {
            return Err(ScriptError::MissingTreeHeader {
                line: header_line,
                found: header.to_string(),
            })
        }
    };

    // stack[i]: открытый узел на глубине i + 1
    let mut stack: Vec<RawNode> = Vec::new();
    let mut root: Option<RawNode> = None;
    let mut indent_width: Option<usize> = None;

    for (line, indent, text) in lines {
        if indent == 0 {
            return Err(ScriptError::Unindented { line });
        }

        // Ширина отступа фиксируется по первому узлу
        let width = *indent_width.get_or_insert(indent);
        if indent % width != 0 {
            return Err(ScriptError::IndentWidth { line, width });
        }

        let depth = indent / width;
        if depth > stack.len() + 1 {
            return Err(ScriptError::IndentJump { line });
        }

        while stack.len() >= depth {
            if let Some(done) = stack.pop() {
                attach(done, &mut stack, &mut root)?;
            }
        }

        stack.push(RawNode {
            line,
            name: text.to_string(),
            children: Vec::new(),
        });
    }

    while let Some(done) = stack.pop() {
        attach(done, &mut stack, &mut root)?;
    }

    let root = root.ok_or_else(|| ScriptError::MissingRoot {
        name: tree_name.clone(),
    })?;

    Ok(BehaviorTree::new(tree_name, build_node(root, registry)?))
}

/// (номер строки с 1, отступ в пробелах, текст без комментария)
fn significant_lines(source: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    source.lines().enumerate().filter_map(|(index, raw)| {
        let code = raw.split('#').next().unwrap_or_default().trim_end();
        let text = code.trim_start();
        if text.is_empty() {
            return None;
        }

        let indent = code[..code.len() - text.len()]
            .chars()
            .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
            .sum();

        Some((index + 1, indent, text))
    })
}

/// `tree Root` или `tree("Root")`
fn parse_header(text: &str) -> Option<String> {
    let rest = text.strip_prefix("tree")?;

    let name = if let Some(inner) = rest.trim().strip_prefix('(') {
        inner.strip_suffix(')')?.trim().trim_matches('"')
    } else if rest.starts_with(char::is_whitespace) {
        rest.trim()
    } else {
        return None;
    };

    if name.is_empty() || name.contains(char::is_whitespace) {
        None
    } else {
        Some(name.to_string())
    }
}

fn attach(
    node: RawNode,
    stack: &mut [RawNode],
    root: &mut Option<RawNode>,
) -> Result<(), ScriptError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_some() => return Err(ScriptError::MultipleRoots { line: node.line }),
        None => *root = Some(node),
    }
    Ok(())
}

fn build_node<C: 'static>(
    node: RawNode,
    registry: &TaskRegistry<C>,
) -> Result<Box<dyn Behavior<C>>, ScriptError> {
    let RawNode { line, name, children } = node;

    match name.as_str() {
        "sequence" | "fallback" | "selector" => {
            if children.is_empty() {
                return Err(ScriptError::EmptyComposite { line, kind: name.clone() });
            }
            let built = children
                .into_iter()
                .map(|child| build_node(child, registry))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(if name == "sequence" {
                builder::sequence(built)
            } else {
                builder::selector(built)
            })
        }

        "not" | "succeed" => {
            let count = children.len();
            let mut children = children.into_iter();
            let (Some(child), None) = (children.next(), children.next()) else {
                return Err(ScriptError::DecoratorArity {
                    line,
                    kind: name.clone(),
                    count,
                });
            };
            let child = build_node(child, registry)?;

            Ok(if name == "not" {
                builder::inverter(child)
            } else {
                builder::always_succeed(child)
            })
        }

        task => {
            let behavior = registry.build(task).ok_or_else(|| ScriptError::UnknownNode {
                line,
                name: task.to_string(),
            })?;
            if !children.is_empty() {
                return Err(ScriptError::TaskWithChildren { line, name: task.to_string() });
            }
            Ok(behavior)
        }
    }
}
