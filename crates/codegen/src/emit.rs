//! C program emission.
//!
//! Layout of a generated program:
//!
//! 1. the runtime header (types, comparison helpers, result recorder),
//! 2. per node in declaration order: file-scope text of groups, example
//!    functions with their each-hooks spliced in, one function per
//!    dispatched hook,
//! 3. the runtime proper (selection, hook engine, reporter),
//! 4. the node table literal and `main`.

use rodzo_core::{Node, NodeKind, Tree};
use rodzo_table::NodeTable;

use crate::escape::{c_comment, c_string, c_text};

const HEADER: &str = include_str!("prelude/header.c");
const RUNTIME: &str = include_str!("prelude/runtime.c");

/// Generate the complete C source for a compiled tree.
pub fn generate(tree: &Tree, table: &NodeTable) -> String {
    let mut out = String::new();
    out.push_str("/* generated by rodzo, do not edit */\n");
    out.push_str(HEADER);

    for node in tree.iter() {
        emit_node(&mut out, tree, node);
    }

    out.push_str(RUNTIME);
    emit_table(&mut out, table);
    emit_main(&mut out);
    out
}

fn emit_node(out: &mut String, tree: &Tree, node: &Node) {
    match node.kind {
        NodeKind::FileGroup => {
            out.push_str(&format!(
                "\n/*\n * {}\n */\n\n",
                c_comment(&node.source_file)
            ));
            out.push_str(&node.body_text);
        }
        NodeKind::Describe | NodeKind::Context => {
            out.push_str(&format!(
                "\n/* {} \"{}\" {} */\n",
                node.kind.label(),
                c_comment(node.text.as_deref().unwrap_or("")),
                origin(node)
            ));
            out.push_str(&node.body_text);
        }
        NodeKind::Example => {
            if let Some(name) = node.unit_name(tree) {
                emit_example(out, tree, node, &name);
            }
        }
        k if k.is_dispatched_hook() => {
            if let Some(name) = node.unit_name(tree) {
                emit_hook(out, node, &name);
            }
        }
        _ => {}
    }
}

fn emit_example(out: &mut String, tree: &Tree, node: &Node, name: &str) {
    let before = tree.enclosing_hooks(node.id, NodeKind::BeforeEach);
    let mut after = tree.enclosing_hooks(node.id, NodeKind::AfterEach);
    after.reverse();

    let over = node.assertions + before.iter().map(|h| h.assertions).sum::<u32>() > 0;
    let done = after.iter().map(|h| h.assertions).sum::<u32>() > 0;

    out.push_str(&format!(
        "\n/* it \"{}\" {} */\n",
        c_comment(node.text.as_deref().unwrap_or("")),
        origin(node)
    ));
    out.push_str(&format!("static void {}(int rdz_nid)\n{{\n", name));
    out.push_str("  (void)rdz_nid;\n");

    for hook in &before {
        out.push_str(&format!("  /* before each {} */\n", origin(hook)));
        out.push_str(&hook.body_text);
    }
    out.push_str(&node.body_text);
    if over {
        out.push_str("rdz_over: ;\n");
    }
    for hook in &after {
        out.push_str(&format!("  /* after each {} */\n", origin(hook)));
        out.push_str(&hook.body_text);
    }
    if done {
        out.push_str("rdz_done: ;\n");
    }
    out.push_str("}\n");
}

fn emit_hook(out: &mut String, node: &Node, name: &str) {
    out.push_str(&format!("\n/* {} {} */\n", node.kind.label(), origin(node)));
    out.push_str(&format!("static void {}(void)\n{{\n", name));
    if node.assertions > 0 {
        out.push_str(&format!("  int rdz_nid = {};\n", node.id));
    }
    out.push_str(&node.body_text);
    if node.assertions > 0 {
        out.push_str("rdz_over: ;\n");
    }
    out.push_str("}\n");
}

fn emit_table(out: &mut String, table: &NodeTable) {
    out.push_str("\n  /*\n   * node table\n   */\n\n");

    for entry in table.iter() {
        let children: Vec<String> = entry
            .children
            .iter()
            .map(|c| c.to_string())
            .chain(std::iter::once("-1".to_string()))
            .collect();
        out.push_str(&format!(
            "static const int rdz_c{}[] = {{ {} }};\n",
            entry.id,
            children.join(", ")
        ));
    }

    out.push_str("\nstatic rdz_node rdz_nodes[] = {\n");
    for entry in table.iter() {
        let (example, hook) = match &entry.unit {
            Some(rodzo_table::UnitRef::Example(name)) => (name.as_str(), "NULL"),
            Some(rodzo_table::UnitRef::Hook(name)) => ("NULL", name.as_str()),
            None => ("NULL", "NULL"),
        };
        let text = if entry.kind.is_selectable() {
            c_text(entry.text.as_deref())
        } else {
            "NULL".to_string()
        };
        out.push_str(&format!(
            "  {{ {}, {}, {}, '{}', {}, {}, {}, {}, {}, rdz_c{}, {}, {}, 0 }},\n",
            entry.id,
            entry.parent.map(|p| p as i64).unwrap_or(-1),
            entry.depth,
            entry.kind.tag(),
            c_string(&entry.file),
            entry.local_line,
            entry.global_line,
            entry.span,
            text,
            entry.id,
            example,
            hook
        ));
    }
    out.push_str("};\n");
}

fn emit_main(out: &mut String) {
    out.push_str(
        "\nint main(int argc, char *argv[])\n{\n  \
         return rdz_main(argc, argv, rdz_nodes, (int)(sizeof(rdz_nodes) / sizeof(rdz_nodes[0])));\n}\n",
    );
}

// -- Helpers --

fn origin(node: &Node) -> String {
    c_comment(&format!("{}:{}", node.source_file, node.local_line))
}
