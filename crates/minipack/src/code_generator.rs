//! Renders one unit into a self-executing script.
//!
//! Layout:
//! 1. a registry object mapping each non-entry member id to a factory
//!    `function (module, exports, require) { ... }`;
//! 2. a runtime `require` that memoizes exports per id for one execution;
//! 3. the entry module's own source, run directly.
//!
//! The entry's `module` object is placed in the runtime cache before the
//! entry runs, so a member that requires the entry back gets its exports
//! (possibly still being populated) and the entry never runs twice. The same
//! cache-before-factory ordering gives cyclic members their partially
//! populated exports.

use crate::module_graph::Module;

const MODULES: &str = "__minipack_modules__";
const CACHE: &str = "__minipack_module_cache__";
const REQUIRE: &str = "__minipack_require__";
const ENTRY: &str = "__minipack_entry_module__";

/// A unit ready for rendering: its entry module plus every member.
#[derive(Debug, Clone, Copy)]
pub struct UnitSource<'a> {
    pub entry: &'a Module,
    pub members: &'a [&'a Module],
}

impl UnitSource<'_> {
    /// Members that go into the registry, in discovery order.
    pub fn registry_modules(&self) -> impl Iterator<Item = &Module> {
        let entry_id = self.entry.id.as_str();
        self.members
            .iter()
            .copied()
            .filter(move |module| module.id != entry_id)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("(() => {\n");
        self.render_registry(&mut out);
        render_runtime(&mut out);
        self.render_entry(&mut out);
        out.push_str("})();\n");
        out
    }

    fn render_registry(&self, out: &mut String) {
        out.push_str(&format!("  var {MODULES} = {{\n"));
        for module in self.registry_modules() {
            out.push_str(&format!(
                "    {}: function (module, exports, require) {{\n",
                js_string(&module.id)
            ));
            push_source(out, &module.transformed_source);
            out.push_str("    },\n");
        }
        out.push_str("  };\n");
    }

    fn render_entry(&self, out: &mut String) {
        out.push_str(&format!(
            "  var {ENTRY} = ({CACHE}[{}] = {{ exports: {{}} }});\n",
            js_string(&self.entry.id)
        ));
        out.push_str("  (function (module, exports, require) {\n");
        push_source(out, &self.entry.transformed_source);
        out.push_str(&format!(
            "  }})({ENTRY}, {ENTRY}.exports, {REQUIRE});\n"
        ));
    }
}

fn render_runtime(out: &mut String) {
    out.push_str(&format!(
        r#"  var {CACHE} = {{}};
  function {REQUIRE}(moduleId) {{
    var cachedModule = {CACHE}[moduleId];
    if (cachedModule !== undefined) {{
      return cachedModule.exports;
    }}
    if (!Object.prototype.hasOwnProperty.call({MODULES}, moduleId)) {{
      throw new Error("Cannot find module '" + moduleId + "'");
    }}
    var module = ({CACHE}[moduleId] = {{ exports: {{}} }});
    {MODULES}[moduleId](module, module.exports, {REQUIRE});
    return module.exports;
  }}
"#
    ));
}

/// Module text goes in verbatim; re-indenting could change template literals.
fn push_source(out: &mut String, source: &str) {
    out.push_str(source);
    if !source.ends_with('\n') {
        out.push('\n');
    }
}

fn js_string(value: &str) -> String {
    // JSON strings are valid JavaScript string literals
    serde_json::Value::from(value).to_string()
}
