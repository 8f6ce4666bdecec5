//! Runtime helpers the lowered tree calls into.
//!
//! Each helper's source text is emitted at most once per compilation, in
//! the order helpers were first used.

use indexmap::IndexMap;

/// A runtime helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polyfill {
    DoWhile,
    While,
    Switch,
    Cond,
    Constructor,
    Curry,
    OptionalCall,
    OptionalProp,
    OptionalMethod,
    MatchObject,
    MatchArray,
}

impl Polyfill {
    pub const ALL: [Polyfill; 11] = [
        Polyfill::DoWhile,
        Polyfill::While,
        Polyfill::Switch,
        Polyfill::Cond,
        Polyfill::Constructor,
        Polyfill::Curry,
        Polyfill::OptionalCall,
        Polyfill::OptionalProp,
        Polyfill::OptionalMethod,
        Polyfill::MatchObject,
        Polyfill::MatchArray,
    ];

    /// The registry name used by `use_polyfill`.
    pub fn name(self) -> &'static str {
        match self {
            Polyfill::DoWhile => "doWhile",
            Polyfill::While => "while",
            Polyfill::Switch => "switch",
            Polyfill::Cond => "cond",
            Polyfill::Constructor => "constructor",
            Polyfill::Curry => "curry",
            Polyfill::OptionalCall => "optionalCall",
            Polyfill::OptionalProp => "optionalProp",
            Polyfill::OptionalMethod => "optionalMethod",
            Polyfill::MatchObject => "matchObject",
            Polyfill::MatchArray => "matchArray",
        }
    }

    pub fn from_name(name: &str) -> Option<Polyfill> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The identifier a lowered call refers to.
    pub fn function_name(self) -> &'static str {
        match self {
            Polyfill::DoWhile => "do__while__",
            Polyfill::While => "while__",
            Polyfill::Switch => "switch__",
            Polyfill::Cond => "cond__",
            Polyfill::Constructor => "constructor__",
            Polyfill::Curry => "_kn",
            Polyfill::OptionalCall => "opt__call__",
            Polyfill::OptionalProp => "opt__prop__",
            Polyfill::OptionalMethod => "opt__method__",
            Polyfill::MatchObject => "match__object__",
            Polyfill::MatchArray => "match__array__",
        }
    }

    /// Leading arguments the builder requires.
    pub fn arity(self) -> usize {
        match self {
            Polyfill::Switch
            | Polyfill::Cond
            | Polyfill::OptionalCall
            | Polyfill::MatchObject
            | Polyfill::MatchArray => 1,
            Polyfill::DoWhile
            | Polyfill::While
            | Polyfill::Constructor
            | Polyfill::Curry
            | Polyfill::OptionalProp
            | Polyfill::OptionalMethod => 2,
        }
    }

    /// Whether the builder gathers arguments past [`Polyfill::arity`] into
    /// an array.
    pub fn is_variadic(self) -> bool {
        matches!(
            self,
            Polyfill::Switch
                | Polyfill::Cond
                | Polyfill::OptionalCall
                | Polyfill::OptionalMethod
                | Polyfill::MatchObject
                | Polyfill::MatchArray
        )
    }

    pub fn text(self) -> &'static str {
        match self {
            Polyfill::DoWhile => DO_WHILE,
            Polyfill::While => WHILE,
            Polyfill::Switch => SWITCH,
            Polyfill::Cond => COND,
            Polyfill::Constructor => CONSTRUCTOR,
            Polyfill::Curry => CURRY,
            Polyfill::OptionalCall => OPTIONAL_CALL,
            Polyfill::OptionalProp => OPTIONAL_PROP,
            Polyfill::OptionalMethod => OPTIONAL_METHOD,
            Polyfill::MatchObject => MATCH_OBJECT,
            Polyfill::MatchArray => MATCH_ARRAY,
        }
    }
}

// ============================================================================
// Helper sources
// ============================================================================

const DO_WHILE: &str = "function do__while__(a,b){var res;do{res=b();}while(a());return res;}";

const WHILE: &str = "function while__(a,b){var res;while(a()){res=b();}return res;}";

// Cases are `[test | def__ault__, thunk]`; a thunk returns `[value, cont__inue__]`
// to fall through into the next case.
const SWITCH: &str = "const cont__inue__={};const def__ault__={};\
function switch__(a,b,i,r){\
for(i=0;i<b.length;i++)if(b[i][0]!==def__ault__&&b[i][0]===a)break;\
if(i===b.length)for(i=0;i<b.length;i++)if(b[i][0]===def__ault__)break;\
for(;i<b.length;i++){r=b[i][1]();if(r[1]!==cont__inue__)return r[0];}\
return r&&r[0];}";

const COND: &str = "const __not__found={};\
function cond__(a,b,v,r){for(v of b){r=v[0](a);if(r!==__not__found)return v[1](...r);}}";

const CONSTRUCTOR: &str =
    "function constructor__(a,b){if(typeof b.is===\"function\")return b.is(a);return a!=null&&a.constructor===b;}";

const CURRY: &str = "const __={};\
let _kn=(f,n,m=(r,s)=>(...a)=>(s=r.map(v=>v===__?a.shift():v).concat(a)).length>=n?f(...s.slice(0,n)):m(s))=>m([]);";

const OPTIONAL_CALL: &str = "function opt__call__(a,b){if(typeof a===\"function\")return a(...b());return a;}";

const OPTIONAL_PROP: &str = "function opt__prop__(a,b){if(a==null)return undefined;return a[b()];}";

const OPTIONAL_METHOD: &str = "function opt__method__(a,b,c,f){if(a==null)return undefined;\
f=a[b()];if(typeof f===\"function\")return f.apply(a,c());return f;}";

// Entries are `[key, matcher | null]`.
const MATCH_OBJECT: &str = "function match__object__(a,b,r,v,x){\
if(a==null)return __not__found;r=[];\
for(v of b){if(!Object.prototype.hasOwnProperty.call(a,v[0]))return __not__found;\
x=v[1]?v[1](a[v[0]]):[a[v[0]]];if(x===__not__found)return __not__found;r.push(...x);}\
return r;}";

const MATCH_ARRAY: &str = "function match__array__(a,b,r,i,x){\
if(!Array.isArray(a)||a.length!==b.length)return __not__found;r=[];\
for(i=0;i<b.length;i++){x=b[i](a[i]);if(x===__not__found)return __not__found;r.push(...x);}\
return r;}";

// ============================================================================
// Registry
// ============================================================================

/// The helpers used so far, in first-use order.
#[derive(Debug, Clone, Default)]
pub struct PolyfillRegistry {
    used: IndexMap<Polyfill, &'static str>,
}

impl PolyfillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `polyfill`. Returns `true` on first use.
    pub fn register(&mut self, polyfill: Polyfill) -> bool {
        if self.used.contains_key(&polyfill) {
            return false;
        }
        tracing::trace!(polyfill = polyfill.name(), "registering polyfill");
        self.used.insert(polyfill, polyfill.text());
        true
    }

    #[inline]
    pub fn contains(&self, polyfill: Polyfill) -> bool {
        self.used.contains_key(&polyfill)
    }

    /// Registry names of the used helpers, in first-use order.
    pub fn names(&self) -> Vec<&'static str> {
        self.used.keys().map(|p| p.name()).collect()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// The concatenated helper sources.
    pub fn text(&self) -> String {
        self.used.values().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = PolyfillRegistry::new();
        assert!(registry.register(Polyfill::Curry));
        assert!(!registry.register(Polyfill::Curry));
        assert_eq!(registry.text(), CURRY);
    }

    #[test]
    fn test_text_keeps_first_use_order() {
        let mut registry = PolyfillRegistry::new();
        registry.register(Polyfill::While);
        registry.register(Polyfill::Cond);
        registry.register(Polyfill::While);
        assert_eq!(registry.names(), vec!["while", "cond"]);
        assert_eq!(registry.text(), format!("{}{}", WHILE, COND));
    }

    #[test]
    fn test_names_round_trip() {
        for polyfill in Polyfill::ALL {
            assert_eq!(Polyfill::from_name(polyfill.name()), Some(polyfill));
        }
        assert_eq!(Polyfill::from_name("typeof"), None);
    }
}
