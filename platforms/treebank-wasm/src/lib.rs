use serde::Serialize;
use treebank_annotator::{read_trees, typed_dependency_head_finder, Configuration, Pipeline};
use treebank_deps::{GrammaticalStructureBuilder, HeadDependencyBuilder};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// The structured response sent back to JavaScript
#[derive(Debug, Serialize)]
pub struct AnnotationReport {
    pub trees: Vec<TreeResult>,
    pub flags: Vec<String>,
    pub unrecognized_flags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TreeResult {
    pub input: String,
    /// `None` when the tree was pruned away.
    pub annotated: Option<String>,
    pub dependencies: Vec<DependencyDebug>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DependencyDebug {
    pub relation: String,
    pub governor: String,
    pub dependent: String,
}

/// An annotator bound to one flag set, kept alive across calls from the page.
#[wasm_bindgen]
pub struct TreebankEngine {
    config: Configuration,
    unrecognized: Vec<String>,
}

#[wasm_bindgen]
impl TreebankEngine {
    /// `flags` is a whitespace-separated token list, e.g. `"-goodPCFG -splitTMP 1"`.
    #[wasm_bindgen(constructor)]
    pub fn new(flags: &str) -> Result<TreebankEngine, JsValue> {
        let tokens: Vec<&str> = flags.split_whitespace().collect();
        let (config, unrecognized) =
            Configuration::from_flags(&tokens).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            config,
            unrecognized,
        })
    }

    /// Bracketed trees in, `AnnotationReport` out.
    pub fn analyze(&self, input: &str) -> Result<JsValue, JsValue> {
        let report = self.report(input).map_err(|e| JsValue::from_str(&e))?;
        serde_wasm_bindgen::to_value(&report).map_err(JsValue::from)
    }
}

impl TreebankEngine {
    fn report(&self, input: &str) -> Result<AnnotationReport, String> {
        let trees = read_trees(input).map_err(|e| e.to_string())?;
        let pipeline = Pipeline::new(&self.config);
        let head_finder = typed_dependency_head_finder(&self.config);
        let builder = HeadDependencyBuilder::new();

        let results = trees
            .iter()
            .map(|tree| {
                let annotated = pipeline.process(tree);
                let (dependencies, error) = match annotated.as_ref().map(|t| builder.build(t, &head_finder)) {
                    Some(Ok(structure)) => (
                        structure
                            .dependencies()
                            .into_iter()
                            .map(|(gov, dep, relation)| DependencyDebug {
                                relation: relation.to_string(),
                                governor: format!("{}-{}", gov.word, gov.index),
                                dependent: format!("{}-{}", dep.word, dep.index),
                            })
                            .collect(),
                        None,
                    ),
                    Some(Err(e)) => (Vec::new(), Some(e.to_string())),
                    None => (Vec::new(), None),
                };
                TreeResult {
                    input: tree.to_string(),
                    annotated: annotated.map(|t| t.to_string()),
                    dependencies,
                    error,
                }
            })
            .collect();

        Ok(AnnotationReport {
            trees: results,
            flags: self.config.to_flags(),
            unrecognized_flags: self.unrecognized.clone(),
        })
    }
}

/// One-shot form of `TreebankEngine::analyze`.
#[wasm_bindgen]
pub fn annotate(input: &str, flags: &str) -> Result<JsValue, JsValue> {
    TreebankEngine::new(flags)?.analyze(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(flags: &[&str]) -> TreebankEngine {
        let (config, unrecognized) = Configuration::from_flags(flags).unwrap();
        TreebankEngine {
            config,
            unrecognized,
        }
    }

    #[test]
    fn test_report() {
        let report = engine(&["-splitTMP", "1", "-retainTMPSubcategories", "-bogus"])
            .report("(S (NP-SBJ (PRP We)) (VP (VBD left) (NP-TMP (NN today))))\n(NP)")
            .unwrap();
        assert_eq!(report.unrecognized_flags, vec!["-bogus".to_string()]);
        assert!(report.flags.contains(&"-retainTMPSubcategories".to_string()));
        assert_eq!(report.trees.len(), 2);

        let first = &report.trees[0];
        assert!(first.annotated.as_deref().unwrap().contains("NP-TMP"));
        assert!(first.error.is_none());
        assert!(first.dependencies.contains(&DependencyDebug {
            relation: "S".to_string(),
            governor: "left-2".to_string(),
            dependent: "We-1".to_string(),
        }));

        assert!(report.trees[1].annotated.is_none());
        assert!(report.trees[1].dependencies.is_empty());
    }

    #[test]
    fn test_bad_input() {
        assert!(engine(&[]).report("(S (NP").is_err());
    }
}
