//! Rule option keywords and the per-signature match list they populate.

use std::slice;

use failure::{bail, format_err, Error, Fail};

use crate::decode::DecodedPacket;
use crate::parse::{Grammar, ParseError};
use crate::window::WindowPredicate;

#[derive(Debug, PartialEq, Fail)]
pub enum SetupError {
    #[fail(display = "{}", _0)]
    Parse(#[cause] ParseError),
    #[fail(display = "failed to allocate match node")]
    Alloc,
}

impl From<ParseError> for SetupError {
    fn from(err: ParseError) -> Self {
        SetupError::Parse(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SigMatchType {
    Window,
}

/// Compiled state of one rule option.
#[derive(Clone, Debug, PartialEq)]
pub enum SigMatchCtx {
    Window(WindowPredicate),
}

impl SigMatchCtx {
    pub fn ty(&self) -> SigMatchType {
        match self {
            SigMatchCtx::Window(_) => SigMatchType::Window,
        }
    }
}

/// One entry of a signature's match list.
///
/// `ctx` is `None` once the keyword released it.
#[derive(Clone, Debug, PartialEq)]
pub struct SigMatch {
    pub ty: SigMatchType,
    pub ctx: Option<SigMatchCtx>,
}

impl SigMatch {
    pub fn new(ctx: SigMatchCtx) -> Self {
        SigMatch {
            ty: ctx.ty(),
            ctx: Some(ctx),
        }
    }

    pub fn window(&self) -> Option<&WindowPredicate> {
        match self.ctx {
            Some(SigMatchCtx::Window(ref wd)) => Some(wd),
            None => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    pub id: u32,
    matches: Vec<SigMatch>,
}

impl Signature {
    pub fn new(id: u32) -> Self {
        Signature {
            id,
            matches: vec![],
        }
    }

    /// Append a match after the ones already declared by the rule.
    pub fn append(&mut self, sm: SigMatch) -> Result<(), SetupError> {
        self.matches.try_reserve(1).map_err(|_| SetupError::Alloc)?;
        self.matches.push(sm);

        Ok(())
    }

    pub fn iter(&self) -> slice::Iter<SigMatch> {
        self.matches.iter()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Per worker state handed to every match function.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectEngineThreadCtx {
    pub id: usize,
}

impl DetectEngineThreadCtx {
    pub fn new(id: usize) -> Self {
        DetectEngineThreadCtx { id }
    }
}

/// A rule option keyword, e.g. `window:`.
pub trait Keyword: Send + Sync {
    fn name(&self) -> &'static str;

    fn ty(&self) -> SigMatchType;

    /// Compile `option` and append it to the signature's match list.
    ///
    /// On error the signature is left untouched.
    fn setup(&self, s: &mut Signature, option: &str) -> Result<(), SetupError>;

    fn matches(
        &self,
        det_ctx: &DetectEngineThreadCtx,
        p: &dyn DecodedPacket,
        s: &Signature,
        m: &SigMatch,
    ) -> bool;

    /// Release the compiled state of `m`, a no-op when already released.
    fn free(&self, m: &mut SigMatch);
}

#[derive(Default)]
pub struct KeywordTable {
    keywords: Vec<Box<dyn Keyword>>,
}

impl KeywordTable {
    pub fn new() -> Self {
        KeywordTable::default()
    }

    /// Table with every keyword this crate provides.
    pub fn builtin() -> Result<Self, Error> {
        let mut table = KeywordTable::new();

        register_window(&mut table)?;

        Ok(table)
    }

    pub fn register(&mut self, keyword: Box<dyn Keyword>) -> Result<(), Error> {
        if self
            .keywords
            .iter()
            .any(|k| k.name() == keyword.name() || k.ty() == keyword.ty())
        {
            bail!("keyword `{}` already registered", keyword.name());
        }

        debug!("registering `{}` keyword", keyword.name());

        self.keywords.push(keyword);

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Keyword> {
        self.keywords
            .iter()
            .find(|k| k.name() == name)
            .map(|k| k.as_ref())
    }

    fn lookup(&self, ty: SigMatchType) -> Option<&dyn Keyword> {
        self.keywords
            .iter()
            .find(|k| k.ty() == ty)
            .map(|k| k.as_ref())
    }

    pub fn names<'a>(&'a self) -> impl Iterator<Item = &'static str> + 'a {
        self.keywords.iter().map(|k| k.name())
    }

    /// Add the option `name: option` to the signature.
    pub fn setup(&self, s: &mut Signature, name: &str, option: &str) -> Result<(), Error> {
        let keyword = self
            .get(name)
            .ok_or_else(|| format_err!("unknown keyword `{}`", name))?;

        keyword
            .setup(s, option)
            .map_err(|err| format_err!("sig {}: `{}: {}`, {}", s.id, name, option, err))
    }

    /// Run the signature's matches in declaration order, stopping at the first miss.
    pub fn matches(
        &self,
        det_ctx: &DetectEngineThreadCtx,
        p: &dyn DecodedPacket,
        s: &Signature,
    ) -> bool {
        s.iter().all(|m| {
            self.lookup(m.ty)
                .map_or(false, |keyword| keyword.matches(det_ctx, p, s, m))
        })
    }

    /// Release every match of the signature and empty its list.
    pub fn free(&self, s: &mut Signature) {
        for m in s.matches.iter_mut() {
            if let Some(keyword) = self.lookup(m.ty) {
                keyword.free(m);
            }
        }

        s.matches.clear();
    }
}

/// `window:` keyword, matching the TCP window size.
pub struct WindowKeyword {
    grammar: Grammar,
}

impl WindowKeyword {
    pub fn new(grammar: Grammar) -> Self {
        WindowKeyword { grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }
}

impl Keyword for WindowKeyword {
    fn name(&self) -> &'static str {
        "window"
    }

    fn ty(&self) -> SigMatchType {
        SigMatchType::Window
    }

    fn setup(&self, s: &mut Signature, option: &str) -> Result<(), SetupError> {
        let wd = self.grammar.compile(option)?;

        s.append(SigMatch::new(SigMatchCtx::Window(wd)))
    }

    fn matches(
        &self,
        det_ctx: &DetectEngineThreadCtx,
        p: &dyn DecodedPacket,
        s: &Signature,
        m: &SigMatch,
    ) -> bool {
        match m.ctx {
            Some(SigMatchCtx::Window(ref wd)) => {
                trace!("worker {} sig {} window: {:?}", det_ctx.id, s.id, wd);

                wd.evaluate(p)
            }
            None => {
                error!("sig {} has a released `window` match attached", s.id);

                false
            }
        }
    }

    fn free(&self, m: &mut SigMatch) {
        m.ctx.take();
    }
}

/// Build the `window:` grammar and add the keyword to `table`.
///
/// An error here leaves the keyword unusable for every rule and must stop startup.
pub fn register_window(table: &mut KeywordTable) -> Result<(), Error> {
    let grammar = Grammar::window()?;

    table.register(Box::new(WindowKeyword::new(grammar)))
}
