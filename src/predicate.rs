//! Spatial predicate taxonomy.
//!
//! This module defines the closed set of relation kinds that deduction can
//! produce, grouped into categories, together with a static lexical table
//! used to phrase relations in natural language.
//!
//! The taxonomy provides:
//! - `SpatialPredicate`, one variant per relation kind with a raw string name
//! - `PredicateTerm`, the phrase, preposition, verb, synonym, reverse and antonym
//! - `SpatialTerms`, lookups over the term table
//! - Category lists (proximity, directionality, adjacency, ...)
//!
//! # Key Conventions
//!
//! - Raw names are the identifiers used in serialized facts ("on top", "al")
//! - Unknown names resolve to `SpatialPredicate::Undefined`, never an error

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup() {
        assert_eq!(SpatialPredicate::named("on top"), SpatialPredicate::OnTop);
        assert_eq!(SpatialPredicate::named("al"), SpatialPredicate::Al);
        assert_eq!(SpatialPredicate::named("in"), SpatialPredicate::In);
        assert_eq!(
            SpatialPredicate::named("four o'clock"),
            SpatialPredicate::FourOClock
        );
        assert_eq!(SpatialPredicate::named("nowhere"), SpatialPredicate::Undefined);
    }

    #[test]
    fn raw_names_are_unique() {
        for (i, a) in SpatialPredicate::ALL.iter().enumerate() {
            for b in &SpatialPredicate::ALL[i + 1..] {
                assert_ne!(a.raw(), b.raw());
            }
            assert_eq!(SpatialPredicate::named(a.raw()), *a);
        }
    }

    #[test]
    fn predicate_by_phrase_and_synonym() {
        assert_eq!(SpatialTerms::predicate("near"), SpatialPredicate::Near);
        assert_eq!(SpatialTerms::predicate("within"), SpatialPredicate::Inside);
        assert_eq!(SpatialTerms::predicate("perpendicular"), SpatialPredicate::Orthogonal);
        assert_eq!(SpatialTerms::predicate("larger"), SpatialPredicate::Bigger);
        assert_eq!(SpatialTerms::predicate("sideways"), SpatialPredicate::Undefined);
    }

    #[test]
    fn phrasing() {
        assert_eq!(SpatialTerms::term(SpatialPredicate::OnTop), "on top");
        assert_eq!(SpatialTerms::term(SpatialPredicate::Bru), "bru");
        assert_eq!(SpatialTerms::term(SpatialPredicate::Undefined), "undefined");
        assert_eq!(
            SpatialTerms::term_with_preposition(SpatialPredicate::Near),
            "near to"
        );
        assert_eq!(
            SpatialTerms::term_with_preposition(SpatialPredicate::Behind),
            "behind"
        );
        assert_eq!(
            SpatialTerms::term_with_verb_and_preposition(SpatialPredicate::SameWidth),
            "has same width as"
        );
        assert_eq!(
            SpatialTerms::term_with_verb_and_preposition(SpatialPredicate::Inside),
            "is inside"
        );
        assert_eq!(
            SpatialTerms::term_with_verb_and_preposition(SpatialPredicate::North),
            "undefined"
        );
    }

    #[test]
    fn symmetry_inverse_negation() {
        assert!(SpatialTerms::symmetric(SpatialPredicate::Near));
        assert!(SpatialTerms::symmetric(SpatialPredicate::Touching));
        assert!(!SpatialTerms::symmetric(SpatialPredicate::Left));
        assert!(!SpatialTerms::symmetric(SpatialPredicate::Inside));
        assert_eq!(SpatialTerms::inverse("inside"), SpatialPredicate::Containing);
        assert_eq!(SpatialTerms::inverse("on"), SpatialPredicate::Beneath);
        assert_eq!(SpatialTerms::inverse("taller"), SpatialPredicate::Shorter);
        assert_eq!(SpatialTerms::inverse("left"), SpatialPredicate::Undefined);
        assert_eq!(SpatialTerms::negation("near"), SpatialPredicate::Far);
        assert_eq!(SpatialTerms::negation("overlapping"), SpatialPredicate::Disjoint);
        assert_eq!(SpatialTerms::negation("above"), SpatialPredicate::Undefined);
    }

    #[test]
    fn topology_joins_its_parts() {
        let parts = PROXIMITY.len()
            + DIRECTIONALITY.len()
            + ADJACENCY.len()
            + ORIENTATIONS.len()
            + ASSEMBLY.len();
        assert_eq!(TOPOLOGY.len(), parts);
        assert!(TOPOLOGY.contains(&SpatialPredicate::Beside));
        assert_eq!(SECTORS.len(), 27);
    }

    #[test]
    fn serializes_as_raw_name() {
        let json = serde_json::to_string(&SpatialPredicate::FrontAligned).unwrap();
        assert_eq!(json, "\"front aligned\"");
        let back: SpatialPredicate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SpatialPredicate::FrontAligned);
    }
}

/// Kinds of spatial relations between a subject and a reference object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialPredicate {
    Undefined,
    // proximity
    Near,
    Far,
    // directionality, by center in the object's frame
    Left,
    Right,
    Above,
    Below,
    Ahead,
    Behind,
    // adjacency, near by and at one side
    OnTop,
    Beneath,
    UpperSide,
    LowerSide,
    LeftSide,
    RightSide,
    FrontSide,
    BackSide,
    // orientations
    Orthogonal,
    Opposite,
    Aligned,
    FrontAligned,
    BackAligned,
    LeftAligned,
    RightAligned,
    // assembly
    Disjoint,
    Inside,
    Containing,
    Overlapping,
    Crossing,
    Touching,
    Meeting,
    Beside,
    Fitting,
    Exceeding,
    // comparability
    Smaller,
    Bigger,
    Shorter,
    Longer,
    Taller,
    Thinner,
    Wider,
    // similarity
    SameWidth,
    SameHeight,
    SameDepth,
    SameLength,
    SameFront,
    SameSide,
    SameFootprint,
    SameVolume,
    SameCenter,
    SamePosition,
    SameCuboid,
    Congruent,
    SameShape,
    SameSurface,
    SamePerimeter,
    // visibility, seen by an observer
    SeenLeft,
    SeenRight,
    InFront,
    AtRear,
    Tangible,
    EightOClock,
    NineOClock,
    TenOClock,
    ElevenOClock,
    TwelveOClock,
    OneOClock,
    TwoOClock,
    ThreeOClock,
    FourOClock,
    // multistage
    SecondLeft,
    SecondRight,
    MostLeft,
    MostRight,
    // connectivity
    On,
    At,
    By,
    In,
    // sectoriality, center within a bbox sector
    I,
    A,
    B,
    L,
    R,
    O,
    U,
    Al,
    Ar,
    Bl,
    Br,
    Ao,
    Au,
    Bo,
    Bu,
    Lo,
    Lu,
    Ro,
    Ru,
    Alo,
    Aro,
    Blo,
    Bro,
    Alu,
    Aru,
    Blu,
    Bru,
    // geography
    North,
    South,
    East,
    West,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

use SpatialPredicate::*;

impl SpatialPredicate {
    /// Every predicate, in declaration order.
    pub const ALL: [SpatialPredicate; 113] = [
        Undefined, Near, Far, Left, Right, Above, Below, Ahead, Behind, OnTop, Beneath,
        UpperSide, LowerSide, LeftSide, RightSide, FrontSide, BackSide, Orthogonal, Opposite,
        Aligned, FrontAligned, BackAligned, LeftAligned, RightAligned, Disjoint, Inside,
        Containing, Overlapping, Crossing, Touching, Meeting, Beside, Fitting, Exceeding,
        Smaller, Bigger, Shorter, Longer, Taller, Thinner, Wider, SameWidth, SameHeight,
        SameDepth, SameLength, SameFront, SameSide, SameFootprint, SameVolume, SameCenter,
        SamePosition, SameCuboid, Congruent, SameShape, SameSurface, SamePerimeter, SeenLeft,
        SeenRight, InFront, AtRear, Tangible, EightOClock, NineOClock, TenOClock,
        ElevenOClock, TwelveOClock, OneOClock, TwoOClock, ThreeOClock, FourOClock,
        SecondLeft, SecondRight, MostLeft, MostRight, On, At, By, In, I, A, B, L, R, O, U, Al,
        Ar, Bl, Br, Ao, Au, Bo, Bu, Lo, Lu, Ro, Ru, Alo, Aro, Blo, Bro, Alu, Aru, Blu, Bru,
        North, South, East, West, NorthWest, NorthEast, SouthWest, SouthEast,
    ];

    /// The raw name of the predicate as used in facts and queries.
    pub fn raw(&self) -> &'static str {
        match self {
            Undefined => "undefined",
            Near => "near",
            Far => "far",
            Left => "left",
            Right => "right",
            Above => "above",
            Below => "below",
            Ahead => "ahead",
            Behind => "behind",
            OnTop => "on top",
            Beneath => "beneath",
            UpperSide => "at upper side",
            LowerSide => "at lower side",
            LeftSide => "at left side",
            RightSide => "at right side",
            FrontSide => "at front side",
            BackSide => "at back side",
            Orthogonal => "orthogonal",
            Opposite => "opposite",
            Aligned => "aligned",
            FrontAligned => "front aligned",
            BackAligned => "back aligned",
            LeftAligned => "left aligned",
            RightAligned => "right aligned",
            Disjoint => "disjoint",
            Inside => "inside",
            Containing => "containing",
            Overlapping => "overlapping",
            Crossing => "crossing",
            Touching => "touching",
            Meeting => "meeting",
            Beside => "beside",
            Fitting => "fitting",
            Exceeding => "exceeding",
            Smaller => "smaller",
            Bigger => "bigger",
            Shorter => "shorter",
            Longer => "longer",
            Taller => "taller",
            Thinner => "thinner",
            Wider => "wider",
            SameWidth => "same width",
            SameHeight => "same height",
            SameDepth => "same depth",
            SameLength => "same length",
            SameFront => "same front face",
            SameSide => "same side face",
            SameFootprint => "same footprint",
            SameVolume => "same volume",
            SameCenter => "same center",
            SamePosition => "same position",
            SameCuboid => "same cuboid",
            Congruent => "congruent",
            SameShape => "same shape",
            SameSurface => "same surface",
            SamePerimeter => "same perimeter",
            SeenLeft => "seen left",
            SeenRight => "seen right",
            InFront => "in front",
            AtRear => "at rear",
            Tangible => "tangible",
            EightOClock => "eight o'clock",
            NineOClock => "nine o'clock",
            TenOClock => "ten o'clock",
            ElevenOClock => "eleven o'clock",
            TwelveOClock => "twelve o'clock",
            OneOClock => "one o'clock",
            TwoOClock => "two o'clock",
            ThreeOClock => "three o'clock",
            FourOClock => "four o'clock",
            SecondLeft => "second left",
            SecondRight => "second right",
            MostLeft => "most left",
            MostRight => "most right",
            On => "on",
            At => "at",
            By => "by",
            In => "in",
            I => "i",
            A => "a",
            B => "b",
            L => "l",
            R => "r",
            O => "o",
            U => "u",
            Al => "al",
            Ar => "ar",
            Bl => "bl",
            Br => "br",
            Ao => "ao",
            Au => "au",
            Bo => "bo",
            Bu => "bu",
            Lo => "lo",
            Lu => "lu",
            Ro => "ro",
            Ru => "ru",
            Alo => "alo",
            Aro => "aro",
            Blo => "blo",
            Bro => "bro",
            Alu => "alu",
            Aru => "aru",
            Blu => "blu",
            Bru => "bru",
            North => "north",
            South => "south",
            East => "east",
            West => "west",
            NorthWest => "northwest",
            NorthEast => "northeast",
            SouthWest => "southwest",
            SouthEast => "southeast",
        }
    }

    /// Look up a predicate by raw name. Unknown names give `Undefined`.
    pub fn named(name: &str) -> SpatialPredicate {
        SpatialPredicate::ALL
            .iter()
            .copied()
            .find(|p| p.raw() == name)
            .unwrap_or(Undefined)
    }

    /// The term table entry, if the predicate has one.
    pub fn term(&self) -> Option<&'static PredicateTerm> {
        TERMS.iter().find(|t| t.code == *self)
    }
}

impl fmt::Display for SpatialPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

impl Serialize for SpatialPredicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.raw())
    }
}

impl<'de> Deserialize<'de> for SpatialPredicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(SpatialPredicate::named(&name))
    }
}

/// Lexical description of a predicate: subject - predicate - object.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateTerm {
    pub code: SpatialPredicate,
    pub predicate: &'static str,
    pub preposition: &'static str,
    pub synonym: &'static str,
    /// Phrase read from object to subject.
    pub reverse: &'static str,
    pub antonym: &'static str,
    pub verb: &'static str,
}

impl PredicateTerm {
    const fn new(code: SpatialPredicate, predicate: &'static str, preposition: &'static str) -> Self {
        PredicateTerm {
            code,
            predicate,
            preposition,
            synonym: "",
            reverse: "",
            antonym: "",
            verb: "is",
        }
    }

    const fn synonym(mut self, synonym: &'static str) -> Self {
        self.synonym = synonym;
        self
    }

    const fn reverse(mut self, reverse: &'static str) -> Self {
        self.reverse = reverse;
        self
    }

    const fn antonym(mut self, antonym: &'static str) -> Self {
        self.antonym = antonym;
        self
    }

    const fn has(mut self) -> Self {
        self.verb = "has";
        self
    }
}

type T = PredicateTerm;

static TERMS: [PredicateTerm; 68] = [
    // proximity
    T::new(Near, "near", "to").synonym("close").reverse("near").antonym("far"),
    T::new(Far, "far", "from").reverse("far").antonym("near"),
    // directionality
    T::new(Left, "left", "of").synonym("to the left"),
    T::new(Right, "right", "of").synonym("to the right"),
    T::new(Ahead, "ahead", "of").synonym("before"),
    T::new(Behind, "behind", "").synonym("after"),
    T::new(Above, "above", "").synonym("over").reverse("below"),
    T::new(Below, "below", "").synonym("under").reverse("above"),
    T::new(L, "left", "of").synonym("to the left"),
    T::new(R, "right", "of").synonym("to the right"),
    T::new(A, "ahead", "of").synonym("before"),
    T::new(B, "behind", "").synonym("after"),
    T::new(O, "above", "").synonym("over").reverse("below"),
    T::new(U, "below", "").synonym("under").reverse("above"),
    // adjacency
    T::new(OnTop, "on top", "of").synonym("at the top").reverse("beneath"),
    T::new(Beneath, "beneath", "").synonym("underneath").reverse("on top"),
    T::new(UpperSide, "at upper side", "of").reverse("at lower side"),
    T::new(LowerSide, "at lower side", "of").reverse("at upper side"),
    T::new(LeftSide, "at left side", "of").synonym("at left-hand side"),
    T::new(RightSide, "at right side", "of").synonym("at right-hand side"),
    T::new(FrontSide, "at front side", "of").synonym("at forefront"),
    T::new(BackSide, "at back side", "of").synonym("at rear side"),
    // orientations
    T::new(Aligned, "aligned", "with").synonym("parallel").reverse("aligned"),
    T::new(Orthogonal, "orthogonal", "to").synonym("perpendicular").reverse("orthogonal"),
    T::new(Opposite, "opposite", "").synonym("vis-a-vis").reverse("opposite"),
    T::new(FrontAligned, "front aligned", "with").reverse("front aligned"),
    T::new(BackAligned, "back aligned", "with").reverse("back aligned"),
    T::new(LeftAligned, "left aligned", "with"),
    T::new(RightAligned, "right aligned", "with"),
    // assembly
    T::new(Inside, "inside", "").synonym("within").reverse("containing"),
    T::new(Containing, "containing", "").synonym("contains").reverse("inside"),
    T::new(Crossing, "crossing", ""),
    T::new(Overlapping, "overlapping", "")
        .synonym("intersecting")
        .reverse("overlapping")
        .antonym("disjoint"),
    T::new(Disjoint, "disjoint", "to").reverse("disjoint").antonym("overlapping"),
    T::new(Touching, "touching", "with").reverse("touching"),
    T::new(Meeting, "meeting", "").reverse("meeting"),
    T::new(Beside, "beside", "").reverse("beside"),
    T::new(Fitting, "fitting", "into").reverse("exceeding"),
    T::new(Exceeding, "exceeding", "into").reverse("fitting"),
    // connectivity
    T::new(On, "on", "").reverse("beneath"),
    T::new(At, "at", "").reverse("meeting"),
    T::new(By, "by", "").reverse("by"),
    T::new(In, "in", "").reverse("containing"),
    // similarity
    T::new(SameWidth, "same width", "as").synonym("similar width").reverse("same width").has(),
    T::new(SameHeight, "same height", "as").synonym("similar height").reverse("same height").has(),
    T::new(SameDepth, "same depth", "as").synonym("similar depth").reverse("same depth").has(),
    T::new(SameLength, "same length", "as").synonym("similar length").reverse("same length").has(),
    T::new(SameFootprint, "same footprint", "as")
        .synonym("similar base area")
        .reverse("same footprint")
        .has(),
    T::new(SameFront, "same front face", "as")
        .synonym("similar front face")
        .reverse("same front face")
        .has(),
    T::new(SameSide, "same side face", "as")
        .synonym("similar side face")
        .reverse("same side face")
        .has(),
    T::new(SameVolume, "same volume", "as").synonym("similar volume").reverse("same volume").has(),
    T::new(SameCuboid, "same cuboid", "as").synonym("similar cuboid").reverse("same cuboid").has(),
    T::new(SameCenter, "same center", "as").synonym("similar center").reverse("same center").has(),
    T::new(SamePosition, "same position", "as")
        .synonym("similar position")
        .reverse("same position")
        .has(),
    T::new(SameShape, "same shape", "as").synonym("similar shape").reverse("same shape").has(),
    T::new(SameSurface, "same surface", "as")
        .synonym("similar surface")
        .reverse("same surface")
        .has(),
    T::new(SamePerimeter, "same perimeter", "as")
        .synonym("similar perimeter")
        .reverse("same perimeter")
        .has(),
    T::new(Congruent, "congruent", "as").reverse("congruent"),
    // comparisons
    T::new(Smaller, "smaller", "than").synonym("tinier").reverse("bigger"),
    T::new(Bigger, "bigger", "than").synonym("larger").reverse("smaller"),
    T::new(Shorter, "shorter", "than").reverse("longer"),
    T::new(Longer, "longer", "than").reverse("shorter"),
    T::new(Taller, "taller", "than").reverse("shorter"),
    T::new(Thinner, "thinner", "than").synonym("narrower").reverse("wider"),
    T::new(Wider, "wider", "than").synonym("thicker").reverse("thinner"),
    // visibility
    T::new(SeenLeft, "seen left", "of").reverse("seen right"),
    T::new(SeenRight, "seen right", "of").reverse("seen left"),
    T::new(InFront, "in front", "of").reverse("at rear"),
];

/// Lookups over the static term table.
pub struct SpatialTerms;

impl SpatialTerms {
    pub fn terms() -> &'static [PredicateTerm] {
        &TERMS
    }

    /// Resolve a raw name, phrase or synonym to a predicate.
    pub fn predicate(name: &str) -> SpatialPredicate {
        let pred = SpatialPredicate::named(name);
        if pred != Undefined {
            return pred;
        }
        TERMS
            .iter()
            .find(|t| t.predicate == name || (!t.synonym.is_empty() && t.synonym == name))
            .map(|t| t.code)
            .unwrap_or(Undefined)
    }

    /// Phrase of the predicate, falling back to its raw name.
    pub fn term(code: SpatialPredicate) -> &'static str {
        match code.term() {
            Some(term) => term.predicate,
            None => code.raw(),
        }
    }

    pub fn term_with_preposition(code: SpatialPredicate) -> String {
        match code.term() {
            Some(term) if !term.preposition.is_empty() => {
                format!("{} {}", term.predicate, term.preposition)
            }
            Some(term) => term.predicate.to_string(),
            None => "undefined".to_string(),
        }
    }

    pub fn term_with_verb_and_preposition(code: SpatialPredicate) -> String {
        match code.term() {
            Some(term) if !term.preposition.is_empty() => {
                format!("{} {} {}", term.verb, term.predicate, term.preposition)
            }
            Some(term) => format!("{} {}", term.verb, term.predicate),
            None => "undefined".to_string(),
        }
    }

    /// True if the relation reads the same from object to subject.
    pub fn symmetric(code: SpatialPredicate) -> bool {
        code.term().is_some_and(|t| t.predicate == t.reverse)
    }

    /// Predicate holding from object to subject, given a phrase.
    pub fn inverse(predicate: &str) -> SpatialPredicate {
        TERMS
            .iter()
            .find(|t| t.predicate == predicate && !t.reverse.is_empty())
            .map(|t| SpatialPredicate::named(t.reverse))
            .unwrap_or(Undefined)
    }

    /// Predicate holding when the given one does not.
    pub fn negation(predicate: &str) -> SpatialPredicate {
        TERMS
            .iter()
            .find(|t| t.predicate == predicate && !t.antonym.is_empty())
            .map(|t| SpatialPredicate::named(t.antonym))
            .unwrap_or(Undefined)
    }
}

pub const PROXIMITY: &[SpatialPredicate] = &[Near, Far];
pub const DIRECTIONALITY: &[SpatialPredicate] = &[Left, Right, Above, Below, Ahead, Behind];
pub const ADJACENCY: &[SpatialPredicate] = &[
    LeftSide, RightSide, OnTop, Beneath, UpperSide, LowerSide, FrontSide, BackSide,
];
pub const ORIENTATIONS: &[SpatialPredicate] = &[
    Orthogonal, Opposite, Aligned, FrontAligned, BackAligned, RightAligned, LeftAligned,
];
pub const ASSEMBLY: &[SpatialPredicate] = &[
    Disjoint, Inside, Containing, Overlapping, Crossing, Touching, Meeting, Beside,
];
pub const TOPOLOGY: &[SpatialPredicate] = &[
    Near, Far, Left, Right, Above, Below, Ahead, Behind, LeftSide, RightSide, OnTop, Beneath,
    UpperSide, LowerSide, FrontSide, BackSide, Orthogonal, Opposite, Aligned, FrontAligned,
    BackAligned, RightAligned, LeftAligned, Disjoint, Inside, Containing, Overlapping, Crossing,
    Touching, Meeting, Beside,
];
pub const CONTACTS: &[SpatialPredicate] = &[On, At, By, In];
pub const CONNECTIVITY: &[SpatialPredicate] = &[On, At, By, In];
pub const COMPARABILITY: &[SpatialPredicate] = &[
    Smaller, Bigger, Shorter, Longer, Taller, Thinner, Wider, Fitting, Exceeding,
];
pub const SIMILARITY: &[SpatialPredicate] = &[
    SameHeight, SameWidth, SameDepth, SameLength, SameFront, SameSide, SameFootprint,
    SameVolume, SameCenter, SamePosition, SameCuboid, Congruent, SameShape, SameSurface,
    SamePerimeter,
];
pub const VISIBILITY: &[SpatialPredicate] = &[
    SeenLeft, SeenRight, InFront, AtRear, Tangible, EightOClock, NineOClock, TenOClock,
    ElevenOClock, TwelveOClock, OneOClock, TwoOClock, ThreeOClock, FourOClock,
];
pub const GEOGRAPHY: &[SpatialPredicate] = &[
    North, South, East, West, NorthWest, NorthEast, SouthWest, SouthEast,
];
pub const SECTORS: &[SpatialPredicate] = &[
    I, A, B, O, U, L, R, Al, Ar, Bl, Br, Ao, Au, Bo, Bu, Lo, Lu, Ro, Ru, Alo, Aro, Blo, Bro,
    Alu, Aru, Blu, Bru,
];
