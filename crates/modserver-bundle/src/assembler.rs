//! Concatenation of resolved modules into one payload.
//!
//! For each module, in resolution order, the payload contains:
//! 1. an optional `/* Module: <name> */` marker line,
//! 2. the compiled source verbatim followed by a newline,
//! 3. a registration line storing the module's export in the page registry.
//!
//! When a source map is requested, each module contributes one section whose
//! offset is the payload line where its compiled source begins. The
//! registration line is not described by the module's own map, so it is
//! counted separately when advancing to the next section.

use std::fmt::Write;

use modserver_core::DEFAULT_REGISTRY_NAMESPACE;
use modserver_store::ModuleStore;
use serde::{Deserialize, Serialize};

use crate::error::BundleError;
use crate::sectioned::{Offset, Section, SectionedSourceMap};

/// Options controlling payload assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleOptions {
    /// Emit a comment line naming each module before its source.
    pub include_debug_markers: bool,

    /// Build a sectioned source map alongside the payload.
    pub build_source_map: bool,

    /// `sourceRoot` written into every embedded map, pointing the debugger at
    /// the original-source passthrough. `None` clears it.
    pub source_root_prefix: Option<String>,

    /// Script expression of the page registry that registration lines write to.
    pub registry_namespace: String,

    /// `file` field of the sectioned map.
    pub map_file: String,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        AssembleOptions {
            include_debug_markers: false,
            build_source_map: false,
            source_root_prefix: None,
            registry_namespace: DEFAULT_REGISTRY_NAMESPACE.to_string(),
            map_file: "payload.js".to_string(),
        }
    }
}

/// An assembled payload.
#[derive(Debug, Clone)]
pub struct Payload {
    /// Length of `source` in bytes.
    pub byte_length: usize,
    /// The concatenated script document.
    pub source: String,
    /// The sectioned map, present only when requested.
    pub source_map: Option<SectionedSourceMap>,
}

/// Concatenates the cached sources of `names`, in order, into one payload.
///
/// `names` must already be in dependency-first order (as produced by
/// [`ModuleGraph::resolve`](modserver_core::ModuleGraph::resolve)); the
/// payload executes top to bottom.
pub fn assemble<S: AsRef<str>>(
    store: &ModuleStore,
    names: &[S],
    options: &AssembleOptions,
) -> Result<Payload, BundleError> {
    let mut source = String::new();
    let mut sections = options
        .build_source_map
        .then(|| SectionedSourceMap::new(options.map_file.clone()));
    let mut current_line = 1;

    for name in names {
        let name = name.as_ref();
        let module = store.get(name)?;

        if options.include_debug_markers {
            // Writing to a String cannot fail.
            let _ = writeln!(source, "/* Module: {} */", name);
            current_line += 1;
        }

        source.push_str(module.source());
        source.push('\n');
        let _ = writeln!(source, "{}.{}={};", options.registry_namespace, name, name);

        if let Some(map) = sections.as_mut() {
            let mut module_map = module.source_map();
            module_map.source_root = options.source_root_prefix.clone();
            map.sections.push(Section {
                offset: Offset {
                    line: current_line,
                    column: 0,
                },
                map: module_map,
            });
            current_line += module.line_count() + 1;
        }
    }

    Ok(Payload {
        byte_length: source.len(),
        source,
        source_map: sections,
    })
}
