use super::*;

/// The parameters of an operator instance, type checked and sorted into
/// bins according to the gamut of the operator (plus the common gamut)
#[derive(Debug, Default)]
pub struct ParsedParameters {
    pub name: String,

    pub boolean: BTreeSet<&'static str>,
    pub real: BTreeMap<&'static str, f64>,
    pub series: BTreeMap<&'static str, Vec<f64>>,
    pub text: BTreeMap<&'static str, String>,
    pub ignored: Vec<String>,
    pub given: BTreeMap<String, String>,
}

// Accessors
impl ParsedParameters {
    pub fn boolean(&self, key: &str) -> bool {
        self.boolean.contains(key)
    }
    pub fn real(&self, key: &str) -> Result<f64, Error> {
        if let Some(value) = self.real.get(key) {
            return Ok(*value);
        }
        Err(Error::MissingParam(key.to_string()))
    }
    pub fn series(&self, key: &str) -> Result<&[f64], Error> {
        if let Some(value) = self.series.get(key) {
            return Ok(value);
        }
        Err(Error::MissingParam(key.to_string()))
    }
    pub fn text(&self, key: &str) -> Result<String, Error> {
        if let Some(value) = self.text.get(key) {
            return Ok(value.to_string());
        }
        Err(Error::MissingParam(key.to_string()))
    }
    pub fn ignored(&self) -> Vec<String> {
        self.ignored.clone()
    }

    /// A real valued parameter given in degrees, converted to radians
    pub fn angle(&self, key: &str) -> Result<f64, Error> {
        Ok(self.real(key)?.to_radians())
    }
}

impl ParsedParameters {
    pub fn new(
        parameters: &RawParameters,
        gamut: &[OpParameter],
    ) -> Result<ParsedParameters, Error> {
        let locals = parameters.definition.split_into_parameters();
        let globals = &parameters.globals;
        let mut boolean = BTreeSet::<&'static str>::new();
        let mut real = BTreeMap::<&'static str, f64>::new();
        let mut series = BTreeMap::<&'static str, Vec<f64>>::new();
        let mut text = BTreeMap::<&'static str, String>::new();

        // The operator specific gamut takes precedence over the common one
        let common = COMMON_GAMUT
            .iter()
            .filter(|c| gamut.iter().all(|p| p.key() != c.key()));

        // Try to locate all accepted parameters, type check, and place
        // them into their proper bins
        for p in gamut.iter().chain(common) {
            match *p {
                OpParameter::Flag { key } => {
                    if let Some(value) = chase(globals, &locals, key)? {
                        if value.is_empty() || value.to_lowercase() == "true" {
                            boolean.insert(key);
                            continue;
                        }
                        warn!("Cannot parse {key}:{value} as a boolean constant!");
                        return Err(Error::BadParam(key.to_string(), value));
                    }
                    // Flags are implicitly false when not given
                    continue;
                }

                OpParameter::Real { key, default } => {
                    if let Some(value) = chase(globals, &locals, key)? {
                        if let Ok(v) = value.parse::<f64>() {
                            real.insert(key, v);
                            continue;
                        }
                        warn!("Cannot parse {key}:{value} as a real number");
                        return Err(Error::BadParam(key.to_string(), value));
                    }

                    if let Some(value) = default {
                        real.insert(key, value);
                        continue;
                    }

                    error!("Missing required parameter '{key}'");
                    return Err(Error::MissingParam(key.to_string()));
                }

                OpParameter::Series { key, default } => {
                    let value = match chase(globals, &locals, key)? {
                        Some(value) => value,
                        None => match default {
                            // Defaults to nothing: leave it out of the bin
                            Some("") => continue,
                            Some(value) => value.to_string(),
                            None => {
                                error!("Missing required parameter '{key}'");
                                return Err(Error::MissingParam(key.to_string()));
                            }
                        },
                    };

                    let mut elements = Vec::<f64>::new();
                    for element in value.split(',') {
                        if let Ok(v) = element.trim().parse::<f64>() {
                            elements.push(v);
                            continue;
                        }
                        warn!("Cannot parse {key}:{value} as a series");
                        return Err(Error::BadParam(key.to_string(), value.to_string()));
                    }
                    series.insert(key, elements);
                }

                OpParameter::Text { key, default } => {
                    if let Some(value) = chase(globals, &locals, key)? {
                        text.insert(key, value);
                        continue;
                    }

                    if let Some(value) = default {
                        text.insert(key, value.to_string());
                        continue;
                    }

                    error!("Missing required parameter '{key}'");
                    return Err(Error::MissingParam(key.to_string()));
                }
            };
        }

        let name = locals
            .get("proj")
            .unwrap_or(&"unknown".to_string())
            .to_string();

        // Params specified, but not used
        let ignored: Vec<String> = locals
            .keys()
            .filter(|k| !RESERVED.contains(&k.as_str()))
            .filter(|k| {
                let k = k.as_str();
                gamut.iter().chain(COMMON_GAMUT.iter()).all(|p| p.key() != k)
            })
            .cloned()
            .collect();
        for key in &ignored {
            warn!("{name}: ignoring unknown parameter '{key}'");
        }

        Ok(ParsedParameters {
            name,
            boolean,
            real,
            series,
            text,
            ignored,
            given: locals,
        })
    }
}

// Handled by the operator factory, rather than by the individual operators
const RESERVED: [&str; 3] = ["proj", "init", "step"];

// ----- A N C I L L A R Y   F U N C T I O N S -----------------------------------------

/// Look up `key` among the local parameters first, then among the globals.
///
/// A value prefixed by `*` is a default: it is used only when no proper
/// value is found elsewhere. This lets `init=` resources provide defaults
/// that the invocation may override.
pub fn chase(
    globals: &BTreeMap<String, String>,
    locals: &BTreeMap<String, String>,
    key: &str,
) -> Result<Option<String>, Error> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Syntax(String::from("Empty key")));
    }

    let Some(value) = locals.get(key).or_else(|| globals.get(key)) else {
        return Ok(None);
    };
    let value = value.trim();

    let Some(default) = value.strip_prefix('*') else {
        return Ok(Some(value.to_string()));
    };

    // A default given locally may still be overridden by a proper global
    if let Some(global) = globals.get(key) {
        if !global.starts_with('*') {
            return Ok(Some(global.trim().to_string()));
        }
    }
    Ok(Some(default.to_string()))
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const GAMUT: [OpParameter; 5] = [
        OpParameter::Flag    { key: "flag" },
        OpParameter::Real    { key: "real",     default: Some(1.25) },
        OpParameter::Series  { key: "series",   default: Some("1,2,3,4") },
        OpParameter::Text    { key: "text",     default: Some("text") },
        OpParameter::Real    { key: "lon_0",    default: Some(9.) },
    ];

    #[test]
    fn basic() -> Result<(), Error> {
        let globals = BTreeMap::from([("ellps".to_string(), "GRS80".to_string())]);
        let raw = RawParameters::new("proj=cucumber flag real=3 whatnot=7 over", &globals);
        let p = ParsedParameters::new(&raw, &GAMUT)?;

        assert_eq!(p.name, "cucumber");
        assert!(p.boolean("flag"));
        assert!(!p.boolean("galf"));
        assert_eq!(p.real("real")?, 3.);

        // Series correctly parsed?
        let series = p.series("series")?;
        assert_eq!(series.len(), 4);
        assert_eq!(series[0], 1.);
        assert_eq!(series[3], 4.);

        assert_eq!(p.text("text")?, "text");

        // The operator's own default wins over the common one...
        assert_eq!(p.real("lon_0")?, 9.);
        // ...while the common parameters are there for everyone
        assert!(p.boolean("over"));
        assert_eq!(p.real("x_0")?, 0.);
        assert_eq!(p.text("ellps")?, "GRS80");

        // Unknown parameters are kept, and reported
        assert_eq!(p.ignored(), vec!["whatnot".to_string()]);
        assert!(matches!(p.real("whatnot"), Err(Error::MissingParam(_))));
        Ok(())
    }

    #[test]
    fn malformed() {
        let globals = BTreeMap::new();
        let raw = RawParameters::new("proj=cucumber real=three", &globals);
        let p = ParsedParameters::new(&raw, &GAMUT);
        assert!(matches!(p, Err(Error::BadParam(_, _))));

        let raw = RawParameters::new("proj=cucumber flag=maybe", &globals);
        let p = ParsedParameters::new(&raw, &GAMUT);
        assert!(matches!(p, Err(Error::BadParam(_, _))));

        const REQUIRED: [OpParameter; 1] = [OpParameter::Real { key: "lat_ts", default: None }];
        let raw = RawParameters::new("proj=cucumber", &globals);
        let p = ParsedParameters::new(&raw, &REQUIRED);
        assert!(matches!(p, Err(Error::MissingParam(_))));
    }

    #[test]
    fn defaults() -> Result<(), Error> {
        let globals = BTreeMap::new();
        let locals = "proj=helmert x=*1".split_into_parameters();
        assert_eq!(chase(&globals, &locals, "x")?, Some("1".to_string()));

        // First occurrence wins, so an invocation prepended to a
        // resource overrides the resource default
        let locals = "x=2 proj=helmert x=*1".split_into_parameters();
        assert_eq!(chase(&globals, &locals, "x")?, Some("2".to_string()));
        assert_eq!(chase(&globals, &locals, "y")?, None);
        assert!(chase(&globals, &locals, " ").is_err());
        Ok(())
    }
}
