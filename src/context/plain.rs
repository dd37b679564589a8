use crate::authoring::*;
use std::path::PathBuf;

// ----- T H E   P L A I N   C O N T E X T ---------------------------------------------

/// A context provider, supporting built in and run-time defined operators,
/// and resources given either at run time or as files.
///
/// File resources are searched for in the `resources` subdirectory of
/// `./geoexec` and of `geoexec` under the platform's local data directory.
/// A resource named `prefix:suffix` is read from `prefix_suffix.resource`,
/// or from the `<suffix>` section of `prefix.register`.
#[derive(Debug)]
pub struct Plain {
    minimal: Minimal,
    paths: Vec<PathBuf>,
}

impl Default for Plain {
    fn default() -> Plain {
        let mut paths = Vec::new();

        let localpath: PathBuf = [".", "geoexec"].iter().collect();
        paths.push(localpath);

        if let Some(mut userpath) = dirs::data_local_dir() {
            userpath.push("geoexec");
            paths.push(userpath);
        }

        Plain {
            minimal: Minimal::default(),
            paths,
        }
    }
}

impl Plain {
    /// Search `path` before the default search paths
    pub fn with_path(path: impl Into<PathBuf>) -> Plain {
        let mut ctx = Plain::default();
        ctx.paths.insert(0, path.into());
        ctx
    }

    fn file_resource(&self, name: &str) -> Result<String, Error> {
        let Some((prefix, suffix)) = name.split_once(':') else {
            return Err(Error::BadParam(
                "needing prefix:suffix format".to_string(),
                name.to_string(),
            ));
        };

        // We do not know yet whether the resource is in a separate resource
        // file or in a resource register, so we try both
        let resource = format!("{prefix}_{suffix}.resource");
        let register = format!("{prefix}.register");
        let tag = format!("<{suffix}>");

        for path in &self.paths {
            let dir = path.join("resources");
            if let Ok(result) = std::fs::read_to_string(dir.join(&resource)) {
                return Ok(result.trim().to_string());
            }

            let Ok(text) = std::fs::read_to_string(dir.join(&register)) else {
                continue;
            };
            let Some(start) = text.find(&tag) else {
                continue;
            };
            let body = &text[start + tag.len()..];
            // The item ends where the next one starts, or at end-of-file
            let end = body.find('<').unwrap_or(body.len());
            return Ok(body[..end].trim().to_string());
        }

        Err(Error::NotFound(name.to_string(), ": Resource".to_string()))
    }
}

impl Context for Plain {
    fn new() -> Plain {
        Plain::default()
    }

    fn op(&mut self, definition: &str) -> Result<OpHandle, Error> {
        // Instantiate with self as context, so file resources are reachable
        let op = Op::new(definition, self)?;
        Ok(self.minimal.insert(op))
    }

    fn apply(
        &self,
        op: OpHandle,
        direction: Direction,
        operands: &mut dyn CoordinateSet,
    ) -> Result<usize, Error> {
        self.minimal.apply(op, direction, operands)
    }

    fn trans(&self, op: OpHandle, direction: Direction, coord: Coor4D) -> Result<Coor4D, Error> {
        self.minimal.trans(op, direction, coord)
    }

    fn errno(&self) -> Option<Errno> {
        self.minimal.errno()
    }

    fn reset_errno(&self) -> Option<Errno> {
        self.minimal.reset_errno()
    }

    fn globals(&self) -> BTreeMap<String, String> {
        self.minimal.globals()
    }

    fn steps(&self, op: OpHandle) -> Result<Vec<String>, Error> {
        self.minimal.steps(op)
    }

    fn params(&self, op: OpHandle, index: Option<usize>) -> Result<&ParsedParameters, Error> {
        self.minimal.params(op, index)
    }

    fn descriptor(&self, op: OpHandle, index: Option<usize>) -> Result<&OpDescriptor, Error> {
        self.minimal.descriptor(op, index)
    }

    fn register_op(&mut self, name: &str, constructor: OpConstructor) {
        self.minimal.register_op(name, constructor);
    }

    fn get_op(&self, name: &str) -> Result<OpConstructor, Error> {
        self.minimal.get_op(name)
    }

    fn register_resource(&mut self, name: &str, definition: &str) {
        self.minimal.register_resource(name, definition);
    }

    fn get_resource(&self, name: &str) -> Result<String, Error> {
        // Run-time definitions take precedence over files
        if let Ok(result) = self.minimal.get_resource(name) {
            return Ok(result);
        }
        self.file_resource(name)
    }
}

// ----- T E S T S ---------------------------------------------------------------------
