use std::collections::BTreeMap;

/// Convenience methods for lexical analysis of PROJ style operator definitions.
/// - For splitting a definition into argument tokens
/// - For splitting the tokens into parameters (i.e. key=value-pairs)
/// - For syntactical normalization by eliminating non-significant whitespace,
///   comments, and the optional `+` prefix of PROJ strings
/// - For checking whether a given definition is a pipeline, and
/// - For accessing the name of a given operator.
pub trait Tokenize {
    /// Split a definition into argument tokens:
    /// ```txt
    /// '+proj=merc  +lon_0 = 12 +over' -> ['proj=merc', 'lon_0=12', 'over']
    /// ```
    fn split_into_args(&self) -> Vec<String>;

    /// Split into parameters. Flags get the value `true`. When a key is
    /// given more than once, the first occurrence wins:
    /// ```txt
    /// 'proj=cart ellps=intl inv ellps=GRS80' -> ('ellps=intl', 'inv=true', 'proj=cart')
    /// ```
    fn split_into_parameters(&self) -> BTreeMap<String, String>;

    /// Remove comments (from `#` to end of line), glue key-value pairs
    /// together by omitting whitespace around '=' and ',', and strip the
    /// PROJ '+' prefix from each token:
    /// ```txt
    /// '+proj=helmert  +x = 1 # translate'  ->  'proj=helmert x=1'
    /// ```
    fn normalize(&self) -> String;

    /// True if the definition instantiates a pipeline, i.e. includes `proj=pipeline`
    fn is_pipeline(&self) -> bool;

    /// The value of the `proj` key, or `default` if not given
    fn operator_name(&self, default: &str) -> String;

    /// The number of times the bare flag `flag` occurs
    fn count_flag(&self, flag: &str) -> usize;
}

/// Tokenize implementation for string-like objects
impl<T> Tokenize for T
where
    T: AsRef<str>,
{
    fn split_into_args(&self) -> Vec<String> {
        self.normalize()
            .split_whitespace()
            .map(|x| x.to_string())
            .collect()
    }

    fn split_into_parameters(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        for arg in self.split_into_args() {
            // Flags are booleans that are true when specified, false when not
            let (key, value) = match arg.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (arg, "true".to_string()),
            };
            params.entry(key).or_insert(value);
        }
        params
    }

    fn normalize(&self) -> String {
        // Impose some line ending sanity, and remove comments
        let all = self.as_ref().replace("\r\n", "\n").replace('\r', "\n");
        let mut trimmed = String::new();
        for line in all.lines() {
            let line = match line.split_once('#') {
                Some((before, _comment)) => before,
                None => line,
            };
            trimmed += " ";
            trimmed += line.trim();
        }

        let elements: Vec<_> = trimmed.split_whitespace().collect();
        let glued = elements
            .join(" ")
            .replace("= ", "=")
            .replace(", ", ",")
            .replace(" =", "=")
            .replace(" ,", ",");

        glued
            .split_whitespace()
            .map(|x| x.trim_start_matches('+'))
            .filter(|x| !x.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_pipeline(&self) -> bool {
        self.split_into_args().iter().any(|x| x == "proj=pipeline")
    }

    fn operator_name(&self, default: &str) -> String {
        self.split_into_parameters()
            .get("proj")
            .unwrap_or(&default.to_string())
            .to_string()
    }

    fn count_flag(&self, flag: &str) -> usize {
        self.split_into_args().iter().filter(|x| *x == flag).count()
    }
}

// ----- T E S T S ---------------------------------------------------------------------
