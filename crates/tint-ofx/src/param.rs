//! Parameter descriptors and time-resolved parameter bindings.
//!
//! A [`ParamDescriptor`] carries a parameter's static metadata (kind, label,
//! default, ranges) in its own [`PropertySet`]. Values at a given time belong
//! to the host; a [`ParamBinding`] only asks the host for them and checks the
//! shape of what comes back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OfxError;
use crate::host::ImageEffectHost;
use crate::keys::param;
use crate::property::{PropertySet, PropertyType, PropertyValue};
use crate::schema;

/// Declared kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Integer,
    Double,
    Boolean,
    Choice,
    Rgb,
    Rgba,
    Double2D,
    Double3D,
    Integer2D,
    Integer3D,
    String,
}

impl ParamKind {
    pub const ALL: [ParamKind; 11] = [
        Self::Integer,
        Self::Double,
        Self::Boolean,
        Self::Choice,
        Self::Rgb,
        Self::Rgba,
        Self::Double2D,
        Self::Double3D,
        Self::Integer2D,
        Self::Integer3D,
        Self::String,
    ];

    /// Type string stored under `OfxParamPropType`.
    pub const fn ofx_name(self) -> &'static str {
        match self {
            Self::Integer => param::TYPE_INTEGER,
            Self::Double => param::TYPE_DOUBLE,
            Self::Boolean => param::TYPE_BOOLEAN,
            Self::Choice => param::TYPE_CHOICE,
            Self::Rgb => param::TYPE_RGB,
            Self::Rgba => param::TYPE_RGBA,
            Self::Double2D => param::TYPE_DOUBLE_2D,
            Self::Double3D => param::TYPE_DOUBLE_3D,
            Self::Integer2D => param::TYPE_INTEGER_2D,
            Self::Integer3D => param::TYPE_INTEGER_3D,
            Self::String => param::TYPE_STRING,
        }
    }

    pub fn from_ofx_name(name: &str) -> Result<Self, OfxError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.ofx_name() == name)
            .ok_or_else(|| OfxError::Unsupported(format!("parameter type {name:?}")))
    }

    /// Number of components in one value.
    pub const fn dimension(self) -> usize {
        match self {
            Self::Integer | Self::Double | Self::Boolean | Self::Choice | Self::String => 1,
            Self::Double2D | Self::Integer2D => 2,
            Self::Rgb | Self::Double3D | Self::Integer3D => 3,
            Self::Rgba => 4,
        }
    }

    /// Property type used for the default and the range.
    pub const fn value_type(self) -> PropertyType {
        match self {
            Self::Integer | Self::Boolean | Self::Choice | Self::Integer2D | Self::Integer3D => {
                PropertyType::Int
            }
            Self::Double | Self::Rgb | Self::Rgba | Self::Double2D | Self::Double3D => {
                PropertyType::Double
            }
            Self::String => PropertyType::String,
        }
    }

    /// Whether the kind has a numeric range.
    pub const fn is_ranged(self) -> bool {
        !matches!(self, Self::Boolean | Self::Choice | Self::String)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ofx_name())
    }
}

/// A parameter value resolved at one time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Integer(i32),
    Double(f64),
    Integer2D([i32; 2]),
    Integer3D([i32; 3]),
    Double2D([f64; 2]),
    Double3D([f64; 3]),
    Rgba([f64; 4]),
    String(String),
}

impl ParamValue {
    /// Whether this value has the shape `kind` stores.
    pub fn fits(&self, kind: ParamKind) -> bool {
        matches!(
            (self, kind),
            (Self::Boolean(_), ParamKind::Boolean)
                | (Self::Integer(_), ParamKind::Integer | ParamKind::Choice)
                | (Self::Double(_), ParamKind::Double)
                | (Self::Integer2D(_), ParamKind::Integer2D)
                | (Self::Integer3D(_), ParamKind::Integer3D)
                | (Self::Double2D(_), ParamKind::Double2D)
                | (Self::Double3D(_), ParamKind::Rgb | ParamKind::Double3D)
                | (Self::Rgba(_), ParamKind::Rgba)
                | (Self::String(_), ParamKind::String)
        )
    }

    /// Property form of the value, for writing into `OfxParamPropDefault`.
    pub fn to_property(&self) -> PropertyValue {
        match self {
            Self::Boolean(v) => (*v).into(),
            Self::Integer(v) => (*v).into(),
            Self::Double(v) => (*v).into(),
            Self::Integer2D(v) => (*v).into(),
            Self::Integer3D(v) => (*v).into(),
            Self::Double2D(v) => (*v).into(),
            Self::Double3D(v) => (*v).into(),
            Self::Rgba(v) => (*v).into(),
            Self::String(v) => v.as_str().into(),
        }
    }

    /// Read a value of `kind` back from a property set entry.
    pub fn from_property(props: &PropertySet, key: &str, kind: ParamKind) -> Result<Self, OfxError> {
        Ok(match kind {
            ParamKind::Boolean => Self::Boolean(props.get_bool(key, 0)?),
            ParamKind::Integer | ParamKind::Choice => Self::Integer(props.get(key, 0)?),
            ParamKind::Double => Self::Double(props.get(key, 0)?),
            ParamKind::Integer2D => Self::Integer2D(ints(props, key)?),
            ParamKind::Integer3D => Self::Integer3D(ints(props, key)?),
            ParamKind::Double2D => Self::Double2D(doubles(props, key)?),
            ParamKind::Rgb | ParamKind::Double3D => Self::Double3D(doubles(props, key)?),
            ParamKind::Rgba => Self::Rgba(doubles(props, key)?),
            ParamKind::String => Self::String(props.get_str(key, 0)?.to_owned()),
        })
    }
}

fn doubles<const N: usize>(props: &PropertySet, key: &str) -> Result<[f64; N], OfxError> {
    let mut out = [0.0; N];
    out.copy_from_slice(&props.get_n::<f64>(key, N)?);
    Ok(out)
}

fn ints<const N: usize>(props: &PropertySet, key: &str) -> Result<[i32; N], OfxError> {
    let mut out = [0; N];
    out.copy_from_slice(&props.get_n::<i32>(key, N)?);
    Ok(out)
}

/// Static metadata for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    name: String,
    kind: ParamKind,
    properties: PropertySet,
}

impl ParamDescriptor {
    pub fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            properties: schema::param_descriptor(name, kind),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    pub fn default_value(&self) -> Result<ParamValue, OfxError> {
        ParamValue::from_property(&self.properties, param::DEFAULT, self.kind)
    }

    pub fn set_label(&mut self, label: &str) -> Result<(), OfxError> {
        self.properties.set_str(crate::keys::prop::LABEL, 0, label)
    }

    pub fn set_hint(&mut self, hint: &str) -> Result<(), OfxError> {
        self.properties.set_str(param::HINT, 0, hint)
    }

    pub fn set_animates(&mut self, animates: bool) -> Result<(), OfxError> {
        self.properties.set_bool(param::ANIMATES, 0, animates)
    }

    pub fn set_default(&mut self, value: ParamValue) -> Result<(), OfxError> {
        if !value.fits(self.kind) {
            return Err(OfxError::ParamKindMismatch {
                name: self.name.clone(),
                kind: self.kind.ofx_name(),
                requested: "default of another kind",
            });
        }
        match value.to_property() {
            PropertyValue::Int(v) => self.properties.set_n(param::DEFAULT, v.as_slice()),
            PropertyValue::Double(v) => self.properties.set_n(param::DEFAULT, v.as_slice()),
            PropertyValue::String(v) => self.properties.set_n(param::DEFAULT, v.as_slice()),
            PropertyValue::Pointer(v) => self.properties.set_n(param::DEFAULT, v.as_slice()),
        }
    }

    /// Hard range, applied to every component.
    pub fn set_range(&mut self, min: f64, max: f64) -> Result<(), OfxError> {
        self.set_bounds(param::MIN, param::MAX, min, max)
    }

    /// Slider range shown by the host. Nothing enforces that it lies inside the
    /// hard range.
    pub fn set_display_range(&mut self, min: f64, max: f64) -> Result<(), OfxError> {
        self.set_bounds(param::DISPLAY_MIN, param::DISPLAY_MAX, min, max)
    }

    fn set_bounds(&mut self, min_key: &str, max_key: &str, min: f64, max: f64) -> Result<(), OfxError> {
        if !self.kind.is_ranged() {
            return Err(OfxError::ParamKindMismatch {
                name: self.name.clone(),
                kind: self.kind.ofx_name(),
                requested: "a range",
            });
        }
        let n = self.kind.dimension();
        match self.kind.value_type() {
            PropertyType::Double => {
                self.properties.set_n(min_key, vec![min; n].as_slice())?;
                self.properties.set_n(max_key, vec![max; n].as_slice())
            }
            _ => {
                self.properties.set_n(min_key, vec![min as i32; n].as_slice())?;
                self.properties.set_n(max_key, vec![max as i32; n].as_slice())
            }
        }
    }
}

/// Parameters of one effect, in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    params: Vec<ParamDescriptor>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter and return it for further setup.
    pub fn define(&mut self, name: &str, kind: ParamKind) -> Result<&mut ParamDescriptor, OfxError> {
        if self.params.iter().any(|p| p.name == name) {
            return Err(OfxError::InvalidArgument(format!(
                "parameter {name:?} is already defined"
            )));
        }
        self.params.push(ParamDescriptor::new(name, kind));
        let last = self.params.len() - 1;
        Ok(&mut self.params[last])
    }

    pub fn get(&self, name: &str) -> Result<&ParamDescriptor, OfxError> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| OfxError::not_found(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Serialize for ParamSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for p in &self.params {
            map.serialize_entry(&p.name, &p.properties)?;
        }
        map.end()
    }
}

/// Typed view of one instance parameter. Never caches; every read goes to the host.
#[derive(Clone, Copy)]
pub struct ParamBinding<'h> {
    name: &'h str,
    kind: ParamKind,
    host: &'h dyn ImageEffectHost,
}

impl fmt::Debug for ParamBinding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamBinding")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<'h> ParamBinding<'h> {
    /// Look up `name` on the host and read its declared kind.
    pub fn fetch(host: &'h dyn ImageEffectHost, name: &'h str) -> Result<Self, OfxError> {
        let props = host.param_properties(name)?;
        let kind = ParamKind::from_ofx_name(props.get_str(param::TYPE, 0)?)?;
        Ok(Self { name, kind, host })
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Host-resolved value at `time`, checked against the declared kind.
    pub fn value_at_time(&self, time: f64) -> Result<ParamValue, OfxError> {
        let value = self.host.param_value_at_time(self.name, time)?;
        if !value.fits(self.kind) {
            return Err(OfxError::HostFailure(format!(
                "host returned {value:?} for {} parameter {:?}",
                self.kind, self.name
            )));
        }
        Ok(value)
    }

    pub fn double_at(&self, time: f64) -> Result<f64, OfxError> {
        self.expect(&[ParamKind::Double], "a scalar double")?;
        match self.value_at_time(time)? {
            ParamValue::Double(v) => Ok(v),
            other => Err(self.bad_shape(&other)),
        }
    }

    pub fn rgb_at(&self, time: f64) -> Result<[f64; 3], OfxError> {
        self.expect(&[ParamKind::Rgb, ParamKind::Double3D], "an RGB triple")?;
        match self.value_at_time(time)? {
            ParamValue::Double3D(v) => Ok(v),
            other => Err(self.bad_shape(&other)),
        }
    }

    pub fn rgba_at(&self, time: f64) -> Result<[f64; 4], OfxError> {
        self.expect(&[ParamKind::Rgba], "an RGBA quadruple")?;
        match self.value_at_time(time)? {
            ParamValue::Rgba(v) => Ok(v),
            other => Err(self.bad_shape(&other)),
        }
    }

    pub fn int_at(&self, time: f64) -> Result<i32, OfxError> {
        self.expect(&[ParamKind::Integer, ParamKind::Choice], "an integer")?;
        match self.value_at_time(time)? {
            ParamValue::Integer(v) => Ok(v),
            other => Err(self.bad_shape(&other)),
        }
    }

    pub fn bool_at(&self, time: f64) -> Result<bool, OfxError> {
        self.expect(&[ParamKind::Boolean], "a boolean")?;
        match self.value_at_time(time)? {
            ParamValue::Boolean(v) => Ok(v),
            other => Err(self.bad_shape(&other)),
        }
    }

    fn expect(&self, kinds: &[ParamKind], requested: &'static str) -> Result<(), OfxError> {
        if kinds.contains(&self.kind) {
            Ok(())
        } else {
            Err(OfxError::ParamKindMismatch {
                name: self.name.to_owned(),
                kind: self.kind.ofx_name(),
                requested,
            })
        }
    }

    fn bad_shape(&self, value: &ParamValue) -> OfxError {
        OfxError::HostFailure(format!("unexpected value {value:?} for {:?}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{effect, prop};
    use crate::standalone::StandaloneHost;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ParamKind::ALL {
            assert_eq!(ParamKind::from_ofx_name(kind.ofx_name()).unwrap(), kind);
        }
        assert!(matches!(
            ParamKind::from_ofx_name("OfxParamTypeCustom"),
            Err(OfxError::Unsupported(_))
        ));
    }

    #[test]
    fn test_descriptor_schema_matches_kind() {
        let rgb = ParamDescriptor::new("rgbGain", ParamKind::Rgb);
        let props = rgb.properties();
        assert_eq!(props.get_str(param::TYPE, 0).unwrap(), param::TYPE_RGB);
        assert_eq!(props.get_str(prop::NAME, 0).unwrap(), "rgbGain");
        assert_eq!(props.dimension(param::DEFAULT).unwrap(), 3);
        assert_eq!(props.dimension(param::MIN).unwrap(), 3);
        assert_eq!(
            props.property_type(param::DEFAULT).unwrap(),
            PropertyType::Double
        );

        let flag = ParamDescriptor::new("bypass", ParamKind::Boolean);
        assert_eq!(
            flag.properties().property_type(param::DEFAULT).unwrap(),
            PropertyType::Int
        );
        assert!(!flag.properties().contains(param::MIN));
    }

    #[test]
    fn test_set_default_and_ranges() {
        let mut gain = ParamDescriptor::new("gain", ParamKind::Double);
        gain.set_default(ParamValue::Double(1.0)).unwrap();
        gain.set_range(0.0, 4.0).unwrap();
        gain.set_display_range(0.0, 2.0).unwrap();
        assert_eq!(gain.default_value().unwrap(), ParamValue::Double(1.0));
        let props = gain.properties();
        assert_eq!(props.get::<f64>(param::MAX, 0).unwrap(), 4.0);
        assert_eq!(props.get::<f64>(param::DISPLAY_MAX, 0).unwrap(), 2.0);
    }

    #[test]
    fn test_set_default_rejects_other_shape() {
        let mut rgb = ParamDescriptor::new("rgbGain", ParamKind::Rgb);
        assert!(matches!(
            rgb.set_default(ParamValue::Double(1.0)),
            Err(OfxError::ParamKindMismatch { .. })
        ));
        rgb.set_default(ParamValue::Double3D([1.0, 0.5, 0.25])).unwrap();
        assert_eq!(
            rgb.default_value().unwrap(),
            ParamValue::Double3D([1.0, 0.5, 0.25])
        );
    }

    #[test]
    fn test_range_on_unranged_kind_is_rejected() {
        let mut label = ParamDescriptor::new("note", ParamKind::String);
        assert!(matches!(
            label.set_range(0.0, 1.0),
            Err(OfxError::ParamKindMismatch { .. })
        ));
    }

    #[test]
    fn test_param_set_keeps_definition_order() {
        let mut params = ParamSet::new();
        params.define("gain", ParamKind::Double).unwrap();
        params.define("rgbGain", ParamKind::Rgb).unwrap();
        params.define("gamma", ParamKind::Double).unwrap();
        let names: Vec<_> = params.iter().map(ParamDescriptor::name).collect();
        assert_eq!(names, ["gain", "rgbGain", "gamma"]);
        assert!(matches!(
            params.define("gain", ParamKind::Integer),
            Err(OfxError::InvalidArgument(_))
        ));
        assert!(matches!(params.get("lift"), Err(OfxError::NotFound { .. })));
    }

    /// Answers every parameter read with a scalar, whatever its kind.
    struct ScalarHost(StandaloneHost);

    // SAFETY: image requests are forwarded to `StandaloneHost` unchanged.
    unsafe impl ImageEffectHost for ScalarHost {
        fn effect_properties(&self) -> &PropertySet {
            self.0.effect_properties()
        }

        fn clip_properties(&self, clip: &str) -> Result<&PropertySet, OfxError> {
            self.0.clip_properties(clip)
        }

        fn param_properties(&self, name: &str) -> Result<&PropertySet, OfxError> {
            self.0.param_properties(name)
        }

        fn param_value_at_time(&self, _name: &str, _time: f64) -> Result<ParamValue, OfxError> {
            Ok(ParamValue::Double(0.5))
        }

        fn clip_get_image(&self, clip: &str, time: f64) -> Result<PropertySet, OfxError> {
            self.0.clip_get_image(clip, time)
        }

        fn clip_release_image(&self, image: PropertySet) -> Result<(), OfxError> {
            self.0.clip_release_image(image)
        }

        fn abort(&self) -> bool {
            self.0.abort()
        }
    }

    fn standalone() -> StandaloneHost {
        StandaloneHost::describe(effect::CONTEXT_FILTER).unwrap()
    }

    #[test]
    fn test_binding_reads_declared_shape() {
        let host = standalone();
        let gain = ParamBinding::fetch(&host, "gain").unwrap();
        assert_eq!(gain.kind(), ParamKind::Double);
        assert_eq!(gain.double_at(0.0).unwrap(), 1.0);
        let rgb = ParamBinding::fetch(&host, "rgbGain").unwrap();
        assert_eq!(rgb.rgb_at(2.0).unwrap(), [1.0, 1.0, 1.0]);
        assert!(matches!(
            ParamBinding::fetch(&host, "lift"),
            Err(OfxError::NotFound { .. })
        ));
    }

    #[test]
    fn test_binding_rejects_shape_of_other_kind() {
        let host = standalone();
        let gain = ParamBinding::fetch(&host, "gain").unwrap();
        let err = gain.rgb_at(0.0).unwrap_err();
        assert!(
            matches!(
                &err,
                OfxError::ParamKindMismatch { name, kind, .. }
                    if name == "gain" && *kind == param::TYPE_DOUBLE
            ),
            "{err:?}"
        );
        assert!(matches!(gain.int_at(0.0), Err(OfxError::ParamKindMismatch { .. })));
        assert!(matches!(gain.bool_at(0.0), Err(OfxError::ParamKindMismatch { .. })));
        assert!(matches!(gain.rgba_at(0.0), Err(OfxError::ParamKindMismatch { .. })));

        let rgb = ParamBinding::fetch(&host, "rgbGain").unwrap();
        assert!(matches!(
            rgb.double_at(0.0),
            Err(OfxError::ParamKindMismatch { .. })
        ));
        assert_eq!(err.status(), crate::error::OfxStatus::BadValue);
    }

    #[test]
    fn test_host_value_of_wrong_shape_is_host_failure() {
        let host = ScalarHost(standalone());
        let rgb = ParamBinding::fetch(&host, "rgbGain").unwrap();
        assert!(matches!(
            rgb.value_at_time(0.0),
            Err(OfxError::HostFailure(_))
        ));
        assert!(matches!(rgb.rgb_at(0.0), Err(OfxError::HostFailure(_))));

        let gain = ParamBinding::fetch(&host, "gain").unwrap();
        assert_eq!(gain.double_at(0.0).unwrap(), 0.5);
    }

    #[test]
    fn test_value_fits_kind() {
        assert!(ParamValue::Double3D([1.0; 3]).fits(ParamKind::Rgb));
        assert!(ParamValue::Integer(2).fits(ParamKind::Choice));
        assert!(!ParamValue::Double(1.0).fits(ParamKind::Rgb));
        assert!(!ParamValue::Rgba([1.0; 4]).fits(ParamKind::Rgb));
    }
}
