//! Cross-module scenarios exercising the registry, scene graph, and
//! scheduler together.
