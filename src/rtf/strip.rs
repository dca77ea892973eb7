//! Plain-text extraction.
//!
//! [`strip_rtf`] walks the markup once with a single tokenizing pattern and
//! keeps only visible text. It never validates structure up front: unknown
//! control words are skipped, unbalanced braces are tolerated, and the only
//! hard failure is empty input.
//!
//! Per group the decoder tracks the `\uc` skip count and whether the group
//! is ignorable (a destination such as `\fonttbl`, or any group opened with
//! `\*`). After a `\u` escape the next `\uc` fallback characters are
//! consumed silently.

use super::error::{RtfError, RtfResult};
use log::trace;
use once_cell::sync::Lazy;
use phf::{phf_map, phf_set};
use regex::Regex;

/// Control word with optional argument, hex escape, control symbol, brace,
/// line breaks, or any other character.
///
/// Control words start lowercase; later capitals are kept for the math
/// destinations Word writes (`\maccPr`). A backslash before a capital is
/// an unknown control symbol.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\([a-z][a-zA-Z]{0,31})(-?\d{1,10})?[ ]?|\\'([0-9a-fA-F]{2})|\\([^a-z])|([{}])|[\r\n]+|(.)",
    )
    .expect("tokenizer pattern is valid")
});

/// Destinations whose content is never visible text.
///
/// `\field` and `\fldrslt` are absent on purpose: the result of a field
/// (hyperlink text, a computed page number) is what a reader displays.
static DESTINATIONS: phf::Set<&'static str> = phf_set! {
    "aftncn", "aftnsep", "aftnsepc", "annotation", "atnauthor", "atndate",
    "atnicn", "atnid", "atnparent", "atnref", "atntime", "atrfend",
    "atrfstart", "author", "background", "bkmkend", "bkmkstart", "blipuid",
    "buptim", "category", "colorschememapping", "colortbl", "comment",
    "company", "creatim", "datafield", "datastore", "defchp", "defpap", "do",
    "doccomm", "docvar", "dptxbxtext", "ebcend", "ebcstart", "factoidname",
    "falt", "fchars", "ffdeftext", "ffentrymcr", "ffexitmcr", "ffformat",
    "ffhelptext", "ffl", "ffname", "ffstattext", "file", "filetbl", "fldinst",
    "fldtype", "fname", "fontemb", "fontfile", "fonttbl", "footer", "footerf",
    "footerl", "footerr", "footnote", "formfield", "ftncn", "ftnsep",
    "ftnsepc", "g", "generator", "gridtbl", "header", "headerf", "headerl",
    "headerr", "hl", "hlfr", "hlinkbase", "hlloc", "hlsrc", "hsv", "htmltag",
    "info", "keycode", "keywords", "latentstyles", "lchars", "levelnumbers",
    "leveltext", "lfolevel", "linkval", "list", "listlevel", "listname",
    "listoverride", "listoverridetable", "listpicture", "liststylename",
    "listtable", "listtext", "lsdlockedexcept", "macc", "maccPr", "mailmerge",
    "maln", "malnScr", "manager", "margPr", "mbar", "mbarPr", "mbaseJc",
    "mbegChr", "mborderBox", "mborderBoxPr", "mbox", "mboxPr", "mchr",
    "mcount", "mctrlPr", "md", "mdeg", "mdegHide", "mden", "mdiff", "mdPr",
    "me", "mendChr", "meqArr", "meqArrPr", "mf", "mfName", "mfPr", "mfunc",
    "mfuncPr", "mgroupChr", "mgroupChrPr", "mgrow", "mhideBot", "mhideLeft",
    "mhideRight", "mhideTop", "mhtmltag", "mlim", "mlimloc", "mlimlow",
    "mlimlowPr", "mlimupp", "mlimuppPr", "mm", "mmaddfieldname", "mmath",
    "mmathPict", "mmathPr", "mmaxdist", "mmc", "mmcJc", "mmconnectstr",
    "mmconnectstrdata", "mmcPr", "mmcs", "mmdatasource", "mmheadersource",
    "mmmailsubject", "mmodso", "mmodsofilter", "mmodsofldmpdata",
    "mmodsomappedname", "mmodsoname", "mmodsorecipdata", "mmodsosort",
    "mmodsosrc", "mmodsotable", "mmodsoudl", "mmodsoudldata",
    "mmodsouniquetag", "mmPr", "mmquery", "mmr", "mnary", "mnaryPr",
    "mnoBreak", "mnum", "mobjDist", "moMath", "moMathPara", "moMathParaPr",
    "mopEmu", "mphant", "mphantPr", "mplcHide", "mpos", "mr", "mrad",
    "mradPr", "mrPr", "msepChr", "mshow", "mshp", "msPre", "msPrePr", "msSub",
    "msSubPr", "msSubSup", "msSubSupPr", "msSup", "msSupPr", "mstrikeBLTR",
    "mstrikeH", "mstrikeTLBR", "mstrikeV", "msub", "msubHide", "msup",
    "msupHide", "mtransp", "mtype", "mvertJc", "mvfmf", "mvfml", "mvtof",
    "mvtol", "mzeroAsc", "mzeroDesc", "mzeroWid", "nesttableprops",
    "nextfile", "nonesttables", "objalias", "objclass", "objdata", "object",
    "objname", "objsect", "objtime", "oldcprops", "oldpprops", "oldsprops",
    "oldtprops", "oleclsid", "operator", "panose", "password",
    "passwordhash", "pgp", "pgptbl", "picprop", "pict", "pn", "pnseclvl",
    "pntext", "pntxta", "pntxtb", "printim", "private", "propname", "protend",
    "protstart", "protusertbl", "pxe", "result", "revtbl", "revtim",
    "rsidtbl", "rxe", "shp", "shpgrp", "shpinst", "shppict", "shprslt",
    "shptxt", "sn", "sp", "staticval", "stylesheet", "subject", "sv", "svb",
    "tc", "template", "themedata", "title", "txe", "ud", "upr", "userprops",
    "wgrffmtfilter", "windowcaption", "writereservation", "writereservhash",
    "xe", "xform", "xmlattrname", "xmlattrvalue", "xmlclose", "xmlname",
    "xmlnstbl", "xmlopen",
};

/// Control words that stand for a character sequence.
static SPECIAL_CHARS: phf::Map<&'static str, &'static str> = phf_map! {
    "par" => "\n",
    "sect" => "\n\n",
    "page" => "\n\n",
    "line" => "\n",
    "tab" => "\t",
    "emdash" => "\u{2014}",
    "endash" => "\u{2013}",
    "emspace" => "\u{2003}",
    "enspace" => "\u{2002}",
    "qmspace" => "\u{2005}",
    "bullet" => "\u{2022}",
    "lquote" => "\u{2018}",
    "rquote" => "\u{2019}",
    "ldblquote" => "\u{201C}",
    "rdblquote" => "\u{201D}",
    "row" => "\n",
    "cell" => "|",
    "nestcell" => "|",
};

/// Windows-1252 characters for bytes 0x80..=0x9F; the rest of the code
/// page matches Latin-1.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => CP1252_HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

/// Decoder state.
struct Stripper {
    out: String,
    /// Saved (skip count, ignorable) of every open group
    stack: Vec<(usize, bool)>,
    ignorable: bool,
    ucskip: usize,
    curskip: usize,
    /// High surrogate waiting for its low half
    pending_high: Option<u16>,
}

impl Stripper {
    fn new(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            stack: Vec::new(),
            ignorable: false,
            ucskip: 1,
            curskip: 0,
            pending_high: None,
        }
    }

    fn flush_surrogate(&mut self) {
        if self.pending_high.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn push_char(&mut self, c: char) {
        self.flush_surrogate();
        self.out.push(c);
    }

    fn push_str(&mut self, s: &str) {
        self.flush_surrogate();
        self.out.push_str(s);
    }

    /// Emit one UTF-16 code unit from a `\u` escape.
    fn push_unit(&mut self, unit: u16) {
        match unit {
            0xD800..=0xDBFF => {
                self.flush_surrogate();
                self.pending_high = Some(unit);
            },
            0xDC00..=0xDFFF => match self.pending_high.take() {
                Some(high) => {
                    let c = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                    self.out
                        .push(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER));
                },
                None => self.out.push(char::REPLACEMENT_CHARACTER),
            },
            _ => self.push_char(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }

    fn brace(&mut self, brace: &str) {
        self.curskip = 0;
        if brace == "{" {
            self.stack.push((self.ucskip, self.ignorable));
        } else {
            match self.stack.pop() {
                Some((ucskip, ignorable)) => {
                    self.ucskip = ucskip;
                    self.ignorable = ignorable;
                },
                None => trace!("ignoring unbalanced closing brace"),
            }
        }
    }

    fn symbol(&mut self, symbol: &str) {
        self.curskip = 0;
        match symbol {
            "*" => self.ignorable = true,
            _ if self.ignorable => {},
            "~" => self.push_char('\u{00A0}'),
            "-" => self.push_char('\u{00AD}'),
            "_" => self.push_char('\u{2011}'),
            "{" | "}" | "\\" => self.push_str(symbol),
            _ => {},
        }
    }

    fn word(&mut self, word: &str, arg: Option<i64>) {
        self.curskip = 0;
        if DESTINATIONS.contains(word) {
            self.ignorable = true;
        } else if self.ignorable {
            // inside a destination
        } else if let Some(text) = SPECIAL_CHARS.get(word) {
            self.push_str(text);
        } else if word == "uc" {
            self.ucskip = arg.map_or(1, |n| n.max(0) as usize);
        } else if word == "u"
            && let Some(n) = arg
        {
            let n = if n < 0 { n + 0x10000 } else { n };
            self.push_unit((n & 0xFFFF) as u16);
            self.curskip = self.ucskip;
        }
    }

    fn literal(&mut self, c: char) {
        if self.curskip > 0 {
            self.curskip -= 1;
        } else if !self.ignorable {
            self.push_char(c);
        }
    }

    fn finish(mut self) -> String {
        self.flush_surrogate();
        self.out
    }
}

/// Extract the visible text of RTF markup.
///
/// # Examples
///
/// ```rust
/// use rtfcraft::rtf::strip_rtf;
///
/// let text = strip_rtf(r"{\rtf1\ansi{\fonttbl\f0 Arial;}\f0 Hello\par}")?;
/// assert_eq!(text, "Hello\n");
/// # Ok::<(), rtfcraft::rtf::RtfError>(())
/// ```
pub fn strip_rtf(input: &str) -> RtfResult<String> {
    if input.is_empty() {
        return Err(RtfError::EmptyInput);
    }

    let mut state = Stripper::new(input.len() / 2);
    for caps in TOKEN.captures_iter(input) {
        if let Some(word) = caps.get(1) {
            let arg = caps.get(2).and_then(|m| m.as_str().parse::<i64>().ok());
            state.word(word.as_str(), arg);
        } else if let Some(hex) = caps.get(3) {
            let Ok(byte) = u8::from_str_radix(hex.as_str(), 16) else {
                continue;
            };
            state.literal(cp1252_char(byte));
        } else if let Some(symbol) = caps.get(4) {
            state.symbol(symbol.as_str());
        } else if let Some(brace) = caps.get(5) {
            state.brace(brace.as_str());
        } else if let Some(c) = caps.get(6) {
            for c in c.as_str().chars() {
                state.literal(c);
            }
        }
        // line breaks in the markup carry no text
    }
    Ok(state.finish())
}
