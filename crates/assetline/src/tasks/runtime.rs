// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Helper functions for lowered scripts.
//!
//! Lowering some syntax (async functions, object rest and spread) calls
//! out to helpers on a global `babelHelpers` object. Bundles are classic
//! scripts with no module loader, so every helper a bundle references is
//! defined in a prelude at the top of that bundle. Several bundles on one
//! page share the same object.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Global the transformer routes helper calls through.
pub(crate) const GLOBAL: &str = "babelHelpers";

struct Helper {
    name: &'static str,
    requires: &'static [&'static str],
    source: &'static str,
}

const HELPERS: &[Helper] = &[
    Helper {
        name: "asyncToGenerator",
        requires: &[],
        source: r#"function asyncGeneratorStep(n,t,e,r,o,a,c){try{var i=n[a](c),u=i.value}catch(n){return void e(n)}i.done?t(u):Promise.resolve(u).then(r,o)}function _asyncToGenerator(n){return function(){var t=this,e=arguments;return new Promise(function(r,o){var a=n.apply(t,e);function _next(n){asyncGeneratorStep(a,r,o,_next,_throw,"next",n)}function _throw(n){asyncGeneratorStep(a,r,o,_next,_throw,"throw",n)}_next(void 0)})}}"#,
    },
    Helper {
        name: "toPrimitive",
        requires: &[],
        source: r#"function _toPrimitive(t,r){if("object"!=typeof t||!t)return t;var e=t[Symbol.toPrimitive];if(void 0!==e){var i=e.call(t,r||"default");if("object"!=typeof i)return i;throw new TypeError("@@toPrimitive must return a primitive value.")}return("string"===r?String:Number)(t)}"#,
    },
    Helper {
        name: "toPropertyKey",
        requires: &["toPrimitive"],
        source: r#"function _toPropertyKey(t){var i=_toPrimitive(t,"string");return"symbol"==typeof i?i:i+""}"#,
    },
    Helper {
        name: "defineProperty",
        requires: &["toPropertyKey"],
        source: r#"function _defineProperty(e,r,t){return(r=_toPropertyKey(r))in e?Object.defineProperty(e,r,{value:t,enumerable:!0,configurable:!0,writable:!0}):e[r]=t,e}"#,
    },
    Helper {
        name: "objectSpread2",
        requires: &["defineProperty"],
        source: r#"function ownKeys(e,r){var t=Object.keys(e);if(Object.getOwnPropertySymbols){var o=Object.getOwnPropertySymbols(e);r&&(o=o.filter(function(r){return Object.getOwnPropertyDescriptor(e,r).enumerable})),t.push.apply(t,o)}return t}function _objectSpread2(e){for(var r=1;r<arguments.length;r++){var t=null!=arguments[r]?arguments[r]:{};r%2?ownKeys(Object(t),!0).forEach(function(r){_defineProperty(e,r,t[r])}):Object.getOwnPropertyDescriptors?Object.defineProperties(e,Object.getOwnPropertyDescriptors(t)):ownKeys(Object(t)).forEach(function(r){Object.defineProperty(e,r,Object.getOwnPropertyDescriptor(t,r))})}return e}"#,
    },
    Helper {
        name: "objectWithoutPropertiesLoose",
        requires: &[],
        source: r#"function _objectWithoutPropertiesLoose(r,e){if(null==r)return{};var t={};for(var n in r)if({}.hasOwnProperty.call(r,n)){if(-1!==e.indexOf(n))continue;t[n]=r[n]}return t}"#,
    },
    Helper {
        name: "objectWithoutProperties",
        requires: &["objectWithoutPropertiesLoose"],
        source: r#"function _objectWithoutProperties(e,t){if(null==e)return{};var o,r,i=_objectWithoutPropertiesLoose(e,t);if(Object.getOwnPropertySymbols){var n=Object.getOwnPropertySymbols(e);for(r=0;r<n.length;r++)o=n[r],-1===t.indexOf(o)&&{}.propertyIsEnumerable.call(e,o)&&(i[o]=e[o])}return i}"#,
    },
    Helper {
        name: "objectDestructuringEmpty",
        requires: &[],
        source: r#"function _objectDestructuringEmpty(t){if(null==t)throw new TypeError("Cannot destructure "+t)}"#,
    },
    Helper {
        name: "extends",
        requires: &[],
        source: r#"function _extends(){return _extends=Object.assign?Object.assign.bind():function(n){for(var e=1;e<arguments.length;e++){var t=arguments[e];for(var r in t)({}).hasOwnProperty.call(t,r)&&(n[r]=t[r])}return n},_extends.apply(null,arguments)}"#,
    },
];

fn helper(name: &str) -> Option<&'static Helper> {
    HELPERS.iter().find(|h| h.name == name)
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bbabelHelpers\.([A-Za-z_$][A-Za-z0-9_$]*)").expect("valid helper regex")
    })
}

/// Helpers `code` calls, sorted and without duplicates.
pub(crate) fn referenced(code: &str) -> BTreeSet<String> {
    reference_pattern()
        .captures_iter(code)
        .map(|c| c[1].to_string())
        .collect()
}

/// Builds the prelude defining `names` and everything they depend on.
///
/// Returns the names no definition exists for as the error.
pub(crate) fn prelude(names: &BTreeSet<String>) -> Result<String, Vec<String>> {
    let unknown: Vec<String> = names
        .iter()
        .filter(|n| helper(n).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }

    let mut needed = BTreeSet::new();
    let mut pending: Vec<&'static Helper> = names.iter().filter_map(|n| helper(n)).collect();
    while let Some(next) = pending.pop() {
        if needed.insert(next.name) {
            pending.extend(next.requires.iter().filter_map(|n| helper(n)));
        }
    }

    let mut out = format!("var {g}={g}||{{}};(function(h){{", g = GLOBAL);
    for h in HELPERS.iter().filter(|h| needed.contains(h.name)) {
        out.push_str(h.source);
    }
    for name in names {
        out.push_str(&format!("h.{n}=h.{n}||_{n};", n = name));
    }
    out.push_str(&format!("}})({});\n", GLOBAL));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_referenced_helpers_are_deduplicated() {
        let code = "babelHelpers.extends({},a);babelHelpers.asyncToGenerator(f);babelHelpers.extends(b)";
        assert_eq!(referenced(code), set(&["asyncToGenerator", "extends"]));
        assert!(referenced("myHelpers.extends(a)").is_empty());
    }

    #[test]
    fn test_prelude_pulls_in_dependencies() {
        let out = prelude(&set(&["objectSpread2"])).unwrap();
        assert!(out.starts_with("var babelHelpers=babelHelpers||{};"));
        assert!(out.contains("function _objectSpread2"));
        assert!(out.contains("function _defineProperty"));
        assert!(out.contains("function _toPrimitive"));
        assert!(out.contains("h.objectSpread2=h.objectSpread2||_objectSpread2;"));
        assert!(!out.contains("_asyncToGenerator"));
    }

    #[test]
    fn test_unknown_helper_is_rejected() {
        let err = prelude(&set(&["classPrivateFieldGet2", "extends"])).unwrap_err();
        assert_eq!(err, vec!["classPrivateFieldGet2".to_string()]);
    }
}
